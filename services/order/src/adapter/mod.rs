pub mod datastore;
pub mod thirdparty;
