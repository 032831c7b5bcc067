#![allow(dead_code)]

mod harness;
pub use harness::*;

mod invitation_flow_tests;
mod multi_tenant_isolation_tests;
