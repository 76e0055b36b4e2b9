//! Integration tests driving the cargo-impact binary against temporary git workspaces

mod helpers;
mod test_affected;
mod test_plan;
mod test_run;
