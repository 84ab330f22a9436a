use crate::config::TwilioConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;

#[derive(Clone)]
pub struct TwilioService {
    client: Client,
    config: TwilioConfig,
}

impl TwilioService {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub async fn send_sms(&self, phone: &str, body: &str) -> AppResult<()> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let params = [("To", phone), ("From", &self.config.from_phone), ("Body", body)];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("SMS sent successfully: {}", phone);
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("SMS failed to send: {}, Error: {}", phone, error_text);
            Err(AppError::ExternalApiError(format!(
                "SMS sending failed: {}",
                error_text
            )))
        }
    }
}

pub fn reservation_confirmed_message(event_name: &str, ticket_holder: &str, quantity: i64) -> String {
    format!(
        "[StagePass] {}: reservation for {} ({} seat(s)) is confirmed. Your tickets are ready.",
        event_name, ticket_holder, quantity
    )
}

pub fn cancellation_approved_message(event_name: &str, ticket_count: i64, refund_amount: i64) -> String {
    format!(
        "[StagePass] {}: cancellation of {} ticket(s) approved. Refund of {} will be wired to your account.",
        event_name, ticket_count, refund_amount
    )
}
