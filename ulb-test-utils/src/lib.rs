pub mod builder;
pub mod constant;
pub mod context;
pub mod error;
pub mod fixtures;

pub use builder::TestBuilder;
pub use context::TestContext;
pub use error::TestError;

pub mod prelude {
    pub use crate::{
        constant::{TEST_LEAGUE_ID, TEST_PLAYER_POOL_GID, TEST_SHEET_ID},
        fixtures::{
            factory,
            mockito::{player_pool_path, transactions_path},
        },
        TestBuilder, TestContext, TestError,
    };
}
