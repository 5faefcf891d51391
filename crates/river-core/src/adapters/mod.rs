mod finmind;
mod fixture;

pub use finmind::{FinmindAdapter, FINMIND_DEFAULT_BASE_URL};
pub use fixture::FixtureSource;
