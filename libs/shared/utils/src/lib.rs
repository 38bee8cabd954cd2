pub mod extractor;
pub mod jwt;
pub mod sanitize;
pub mod test_utils;
