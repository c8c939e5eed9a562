// SeaORM entities
// One module per table created by `models::migrator`.

pub mod account;
pub mod comment;
pub mod post;
pub mod session;
pub mod topic;
pub mod user;


pub mod prelude {
    // Re-export all entities for convenience
    pub use super::account::{
        ActiveModel as AccountActiveModel, Column as AccountColumn, Entity as Account,
        Model as AccountModel,
    };
    pub use super::comment::{
        ActiveModel as CommentActiveModel, Column as CommentColumn, Entity as Comment,
        Model as CommentModel,
    };
    pub use super::post::{
        ActiveModel as PostActiveModel, Column as PostColumn, Entity as Post,
        Model as PostModel,
    };
    pub use super::session::{
        ActiveModel as SessionActiveModel, Column as SessionColumn, Entity as Session,
        Model as SessionModel,
    };
    pub use super::topic::{
        ActiveModel as TopicActiveModel, Column as TopicColumn, Entity as Topic,
        Model as TopicModel,
    };
    pub use super::user::{
        ActiveModel as UserActiveModel, Column as UserColumn, Entity as User,
        Model as UserModel,
    };

    // Re-export commonly used SeaORM types and traits
    pub use sea_orm::{
        ActiveModelTrait,
        ActiveValue,

        ColumnTrait,
        ConnectionTrait,

        // Database and connection types
        Database,
        DatabaseConnection,
        DatabaseTransaction,
        DbConn,
        DbErr,

        // Core traits
        EntityTrait,
        LoaderTrait,
        ModelTrait,
        NotSet,
        PaginatorTrait,
        QueryFilter,
        QueryOrder,
        QuerySelect,
        Related,
        TransactionTrait,

        // Active model helpers
        Set,
        Unchanged,
    };
}
