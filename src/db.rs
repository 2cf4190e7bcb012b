use sqlx::{Pool, Postgres};

mod admin;
pub use admin::AdminUserExt;

mod category;
pub use category::CategoryExt;

mod tour;
pub use tour::TourExt;

mod message;
pub use message::MessageExt;

mod setting;
pub use setting::SettingExt;

#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}
