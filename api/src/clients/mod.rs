pub mod mail;
pub mod mailchimp;

pub use mail::{transport_from_config, HttpMailTransport, LogMailTransport, MailError, MailTransport, OutboundEmail};
pub use mailchimp::{MailchimpClient, MailingListClient, MailingListError, SubscribeRequest};
