// handlers/mod.rs - one module per page of the site
//
// Pages that anyone can see sit next to the ones that need a session;
// the login gate itself lives in middleware, not here.

pub mod about;
pub mod curator;
pub mod history;
pub mod home;
pub mod login;
pub mod signup;
pub mod submit;
pub mod users;
pub mod validation;
pub mod words;

pub use about::{get_about, post_about};
pub use curator::{get_curator, post_curator};
pub use history::{get_history, post_history};
pub use home::{get_home, health};
pub use login::{get_login, get_logout, post_login};
pub use signup::{get_signup, post_signup};
pub use submit::{get_submit, post_submit};
pub use users::post_put_delete_users_id;
pub use words::{get_words, post_words};
