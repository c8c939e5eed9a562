//! Sample data for local development. Running it twice changes nothing.

use sea_orm::{DatabaseConnection, DatabaseTransaction};
use tracing::info;

use crate::{
    entity::prelude::*,
    ids::{CommentId, PostId, TopicId, UserId},
};

const TOPICS: [(&str, &str); 3] = [
    ("programming", "A place for all things programming"),
    ("javascript", "JavaScript community"),
    ("react", "React.js community"),
];

const USER_NAME: &str = "TestUser";
const USER_EMAIL: &str = "test@example.com";
const USER_IMAGE: &str = "https://avatars.githubusercontent.com/u/200636864?v=4";

// (topic slug, title, content)
const POSTS: [(&str, &str, &str); 3] = [
    (
        "programming",
        "Implement charts in our application",
        "We need to add beautiful charts to visualize our data. Looking for recommendations on the best charting libraries for React. I've been looking at Chart.js, Recharts, and Victory. What are your experiences with these libraries?",
    ),
    (
        "programming",
        "What's your favorite programming language and why?",
        "I've been coding for a few years now and I'm curious to hear what languages other developers prefer and their reasoning behind it. Personally, I love TypeScript for its type safety and JavaScript for its flexibility.",
    ),
    (
        "react",
        "Just finished my first React project!",
        "After months of learning, I finally completed my first React application. It's a simple todo app but I'm proud of it! The journey from understanding components to hooks was challenging but rewarding.",
    ),
];

// (index into POSTS, content)
const COMMENTS: [(usize, &str); 3] = [
    (
        0,
        "Great question! I've used Chart.js and it's really easy to get started with. The documentation is excellent.",
    ),
    (
        0,
        "I prefer Recharts for React projects. It's more React-native and the API is very intuitive.",
    ),
    (
        2,
        "Congratulations on your first React project! What was the most challenging part?",
    ),
];

/// Rows inserted by one seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub topics: usize,
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
}

pub async fn run(db: &DatabaseConnection) -> Result<SeedReport, DbErr> {
    let txn = db.begin().await?;
    let mut report = SeedReport::default();

    let mut topics = Vec::with_capacity(TOPICS.len());
    for (slug, description) in TOPICS {
        topics.push(upsert_topic(&txn, slug, description, &mut report).await?);
    }

    let user = upsert_user(&txn, &mut report).await?;

    let mut posts = Vec::with_capacity(POSTS.len());
    for (slug, title, content) in POSTS {
        let topic = topics
            .iter()
            .find(|t| t.slug == slug)
            .ok_or_else(|| DbErr::RecordNotFound(format!("seed topic {slug}")))?;
        posts.push(upsert_post(&txn, topic.id, user.id, title, content, &mut report).await?);
    }

    for (post_index, content) in COMMENTS {
        let post = posts
            .get(post_index)
            .ok_or_else(|| DbErr::RecordNotFound(format!("seed post {post_index}")))?;
        upsert_comment(&txn, post.id, user.id, content, &mut report).await?;
    }

    txn.commit().await?;

    info!(
        "Seeded {} topics, {} users, {} posts, {} comments",
        report.topics, report.users, report.posts, report.comments
    );
    Ok(report)
}

async fn upsert_topic(
    txn: &DatabaseTransaction,
    slug: &str,
    description: &str,
    report: &mut SeedReport,
) -> Result<TopicModel, DbErr> {
    if let Some(topic) = Topic::find()
        .filter(TopicColumn::Slug.eq(slug))
        .one(txn)
        .await?
    {
        return Ok(topic);
    }

    let topic = TopicActiveModel {
        id: Set(TopicId::new()),
        slug: Set(slug.to_string()),
        description: Set(description.to_string()),
        created_at: Set(chrono::Utc::now()),
    };
    report.topics += 1;
    Topic::insert(topic).exec_with_returning(txn).await
}

async fn upsert_user(txn: &DatabaseTransaction, report: &mut SeedReport) -> Result<UserModel, DbErr> {
    if let Some(user) = User::find()
        .filter(UserColumn::Email.eq(USER_EMAIL))
        .one(txn)
        .await?
    {
        return Ok(user);
    }

    let user = UserActiveModel {
        id: Set(UserId::new()),
        name: Set(Some(USER_NAME.to_string())),
        email: Set(Some(USER_EMAIL.to_string())),
        image: Set(Some(USER_IMAGE.to_string())),
        created_at: Set(chrono::Utc::now()),
    };
    report.users += 1;
    User::insert(user).exec_with_returning(txn).await
}

async fn upsert_post(
    txn: &DatabaseTransaction,
    topic_id: TopicId,
    user_id: UserId,
    title: &str,
    content: &str,
    report: &mut SeedReport,
) -> Result<PostModel, DbErr> {
    if let Some(post) = Post::find()
        .filter(PostColumn::TopicId.eq(topic_id))
        .filter(PostColumn::Title.eq(title))
        .one(txn)
        .await?
    {
        return Ok(post);
    }

    let post = PostActiveModel {
        id: Set(PostId::new()),
        title: Set(title.to_string()),
        content: Set(content.to_string()),
        topic_id: Set(topic_id),
        user_id: Set(user_id),
        created_at: Set(chrono::Utc::now()),
    };
    report.posts += 1;
    Post::insert(post).exec_with_returning(txn).await
}

async fn upsert_comment(
    txn: &DatabaseTransaction,
    post_id: PostId,
    user_id: UserId,
    content: &str,
    report: &mut SeedReport,
) -> Result<(), DbErr> {
    let exists = Comment::find()
        .filter(CommentColumn::PostId.eq(post_id))
        .filter(CommentColumn::Content.eq(content))
        .one(txn)
        .await?
        .is_some();
    if exists {
        return Ok(());
    }

    let comment = CommentActiveModel {
        id: Set(CommentId::new()),
        content: Set(content.to_string()),
        post_id: Set(post_id),
        user_id: Set(user_id),
        parent_id: Set(None),
        created_at: Set(chrono::Utc::now()),
    };
    report.comments += 1;
    Comment::insert(comment).exec(txn).await?;

    Ok(())
}
