use serde::{Deserialize, Serialize};

use super::SubscriberEmail;

/// Raw body of a subscription request, before validation.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionForm {
    pub email: String,
}

#[derive(Debug)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
}

impl TryFrom<SubscriptionForm> for NewSubscriber {
    type Error = String;

    fn try_from(form: SubscriptionForm) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(form.email)?;
        Ok(Self { email })
    }
}
