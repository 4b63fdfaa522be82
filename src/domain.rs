mod new_subscriber;
mod subscriber_email;
mod subscription;

pub use new_subscriber::{NewSubscriber, SubscriptionForm};
pub use subscriber_email::{
    email_rule, email_rule_cases, EmailRule, SubscriberEmail, INVALID_EMAIL_MESSAGE,
};
pub use subscription::Subscription;
