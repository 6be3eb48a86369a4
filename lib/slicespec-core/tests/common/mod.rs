use rstest::fixture;
use slicespec_core::Document;
use tracing::info;

pub const PETSTORE: &str = include_str!("../fixtures/petstore.json");

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[fixture]
pub fn petstore() -> Document {
    init_tracing();
    match Document::from_json(PETSTORE) {
        Ok(document) => document,
        Err(error) => {
            panic!("fail to parse the petstore fixture: {error}");
        }
    }
}

pub fn names<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    keys.map(String::as_str).collect()
}
