pub mod migrate;
pub mod promote;
pub mod serve;
pub mod token;
