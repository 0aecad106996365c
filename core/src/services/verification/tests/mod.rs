mod machine_tests;
pub(crate) mod mocks;
