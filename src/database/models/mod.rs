pub mod article;
pub mod comment;
pub mod favorite;
pub mod follow;
pub mod profile;
pub mod tag;
pub mod user;

pub use article::{Article, ArticleChanges, NewArticle};
pub use comment::Comment;
pub use favorite::Favorite;
pub use follow::Follow;
pub use profile::Profile;
pub use tag::Tag;
pub use user::{Account, AccountChanges, NewUser, User};
