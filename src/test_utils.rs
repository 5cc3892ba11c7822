use serde::Deserialize;

pub const PARSING_TESTS_FILE: &str = "tests/parsing_tests.toml";

#[derive(Deserialize, Debug, Clone)]
pub struct TestParsing {
    pub names: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TestParsingData {
    pub tests: Vec<TestParsing>,
}
