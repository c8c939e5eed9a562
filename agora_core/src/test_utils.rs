use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;

use crate::{
    entity::prelude::*,
    ids::{CommentId, PostId, TopicId, UserId},
    models::migrator::Migrator,
};

/// Create a fresh in-memory SQLite database with every migration applied.
///
/// sea-orm keeps a single connection for `sqlite::memory:`, so each call
/// gets an isolated database.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> UserModel {
    let user = UserActiveModel {
        id: Set(UserId::new()),
        name: Set(Some(name.to_string())),
        email: Set(None),
        image: Set(None),
        created_at: Set(chrono::Utc::now()),
    };

    User::insert(user)
        .exec_with_returning(db)
        .await
        .expect("Failed to insert user")
}

pub async fn create_test_topic(db: &DatabaseConnection, slug: &str) -> TopicModel {
    let topic = TopicActiveModel {
        id: Set(TopicId::new()),
        slug: Set(slug.to_string()),
        description: Set(format!("All about {slug}")),
        created_at: Set(chrono::Utc::now()),
    };

    Topic::insert(topic)
        .exec_with_returning(db)
        .await
        .expect("Failed to insert topic")
}

pub async fn create_test_post(
    db: &DatabaseConnection,
    user_id: UserId,
    topic_id: TopicId,
    title: &str,
) -> PostModel {
    let post = PostActiveModel {
        id: Set(PostId::new()),
        title: Set(title.to_string()),
        content: Set(format!("Body of {title}")),
        topic_id: Set(topic_id),
        user_id: Set(user_id),
        created_at: Set(chrono::Utc::now()),
    };

    Post::insert(post)
        .exec_with_returning(db)
        .await
        .expect("Failed to insert post")
}

pub async fn create_test_comment(
    db: &DatabaseConnection,
    user_id: UserId,
    post_id: PostId,
    parent_id: Option<CommentId>,
    content: &str,
) -> CommentModel {
    let comment = CommentActiveModel {
        id: Set(CommentId::new()),
        content: Set(content.to_string()),
        post_id: Set(post_id),
        user_id: Set(user_id),
        parent_id: Set(parent_id),
        created_at: Set(chrono::Utc::now()),
    };

    Comment::insert(comment)
        .exec_with_returning(db)
        .await
        .expect("Failed to insert comment")
}
