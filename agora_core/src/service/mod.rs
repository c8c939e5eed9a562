pub mod comments;
pub mod posts;
pub mod sessions;
pub mod topics;
pub mod users;

pub use comments::{CommentView, CommentsService, CommentsServiceError};
pub use posts::{PostView, PostsService, PostsServiceError};
pub use sessions::SessionsService;
pub use topics::{TopicCounts, TopicWithCount, TopicsService, TopicsServiceError};
pub use users::{ProviderProfile, SessionUser, UsersService, UsersServiceError};
