mod common;
mod test_open;
