pub mod dispatch;
pub mod mailer;
pub mod reference;
pub mod reports;
pub mod users;
pub mod visits;
