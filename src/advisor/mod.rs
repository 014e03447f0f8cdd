//! Natural-language financial advice over recent transactions.
//!
//! Failures never reach the user as errors: each maps to a fixed reply.

pub mod gemini;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::{self, Config};
use crate::core::services::TransactionService;
use crate::currency::CurrencyCode;
use crate::ledger::Transaction;

pub use gemini::GeminiTransport;

/// Transactions included in a prompt.
pub const CONTEXT_TRANSACTIONS: usize = 50;

pub const MISSING_CREDENTIALS_REPLY: &str =
    "API Key not configured. Please check your environment variables.";
pub const TRANSPORT_FAILURE_REPLY: &str =
    "An error occurred while communicating with the AI advisor.";
pub const EMPTY_REPLY: &str = "I couldn't generate an analysis at this time.";
pub const ANALYSIS_FAILURE_REPLY: &str = "Sorry, I encountered an error analyzing your data.";

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor credentials are not configured")]
    MissingCredentials,
    #[error("advisor transport failed: {0}")]
    Transport(String),
    #[error("advisor returned no text")]
    EmptyResponse,
    #[error("failed to serialise transactions: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Text shown to the user in place of an answer.
    pub fn user_message(&self) -> &'static str {
        match self {
            AdvisorError::MissingCredentials => MISSING_CREDENTIALS_REPLY,
            AdvisorError::Transport(_) => TRANSPORT_FAILURE_REPLY,
            AdvisorError::EmptyResponse => EMPTY_REPLY,
            AdvisorError::Serialize(_) => ANALYSIS_FAILURE_REPLY,
        }
    }
}

/// Sends a prompt to a text-generation model and returns its reply.
pub trait AdvisorTransport: Send + Sync {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AdvisorError>;
}

/// Appends the display-currency hint to a user question.
pub fn with_currency_note(question: &str, currency: &CurrencyCode) -> String {
    format!(
        "{question} (Note: My preferred base currency is {currency}. Please provide analysis in this currency where possible.)"
    )
}

/// Full model prompt: preamble, recent transactions as JSON, the question.
pub fn build_prompt(transactions: &[Transaction], question: &str) -> Result<String, AdvisorError> {
    let recent = TransactionService::most_recent(transactions, CONTEXT_TRANSACTIONS);
    let context = serde_json::to_string(&recent)?;
    Ok(format!(
        "You are a financial advisor for the 'BeigeLedger' app.\n\
         Here is a JSON summary of the user's recent transactions:\n\
         {context}\n\
         \n\
         The user is asking: \"{question}\"\n\
         \n\
         Provide a helpful, professional, and concise answer. Focus on insights, trends, and advice.\n\
         Format the response with simple markdown if needed (bolding key figures).\n"
    ))
}

enum TransportState {
    Ready(Box<dyn AdvisorTransport>),
    Unconfigured,
    Broken(String),
}

pub struct Advisor {
    model: String,
    transport: TransportState,
}

impl Advisor {
    pub fn new(model: impl Into<String>, transport: Box<dyn AdvisorTransport>) -> Self {
        Self {
            model: model.into(),
            transport: TransportState::Ready(transport),
        }
    }

    /// Advisor that answers every question with the missing-credentials reply.
    pub fn unconfigured(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            transport: TransportState::Unconfigured,
        }
    }

    /// Builds the Gemini transport from `config` and the environment key.
    pub fn from_config(config: &Config) -> Self {
        let Some(api_key) = config::advisor_api_key() else {
            return Self::unconfigured(config.advisor_model.clone());
        };
        match GeminiTransport::new(api_key, config.advisor_endpoint.clone(), config.advisor_timeout()) {
            Ok(transport) => Self::new(config.advisor_model.clone(), Box::new(transport)),
            Err(err) => {
                error!(error = %err, "could not initialise advisor transport");
                Self {
                    model: config.advisor_model.clone(),
                    transport: TransportState::Broken(err.to_string()),
                }
            }
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.transport, TransportState::Ready(_))
    }

    pub fn try_analyze(&self, transactions: &[Transaction], question: &str) -> Result<String, AdvisorError> {
        let transport = match &self.transport {
            TransportState::Ready(transport) => transport,
            TransportState::Unconfigured => return Err(AdvisorError::MissingCredentials),
            TransportState::Broken(reason) => return Err(AdvisorError::Transport(reason.clone())),
        };
        let prompt = build_prompt(transactions, question)?;
        let reply = transport.generate(&self.model, &prompt)?;
        if reply.trim().is_empty() {
            return Err(AdvisorError::EmptyResponse);
        }
        Ok(reply)
    }

    /// Answer text, or the fixed reply for whatever went wrong.
    pub fn analyze(&self, transactions: &[Transaction], question: &str) -> String {
        match self.try_analyze(transactions, question) {
            Ok(reply) => reply,
            Err(err) => {
                match &err {
                    AdvisorError::Transport(_) => error!(error = %err, "advisor request failed"),
                    _ => warn!(error = %err, "advisor fell back to a canned reply"),
                }
                err.user_message().to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Advisor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Chat log for one advisor session.
#[derive(Debug, Clone)]
pub struct Conversation {
    currency: CurrencyCode,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(currency: CurrencyCode) -> Self {
        let greeting = format!(
            "Hello! I am your BeigeLedger financial assistant. I see your preferred currency is {currency}. Ask me about your spending habits!"
        );
        Self {
            currency,
            messages: vec![Message {
                role: Role::Advisor,
                content: greeting,
            }],
        }
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Records the question and the advisor's reply, returning the reply.
    /// Blank questions are ignored.
    pub fn ask(&mut self, advisor: &Advisor, transactions: &[Transaction], question: &str) -> Option<&Message> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        self.messages.push(Message {
            role: Role::User,
            content: question.to_string(),
        });
        let reply = advisor.analyze(transactions, &with_currency_note(question, &self.currency));
        self.messages.push(Message {
            role: Role::Advisor,
            content: reply,
        });
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{TransactionDraft, TransactionKind};
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeTransport {
        reply: Option<String>,
        prompts: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl AdvisorTransport for FakeTransport {
        fn generate(&self, model: &str, prompt: &str) -> Result<String, AdvisorError> {
            self.prompts
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            self.reply
                .clone()
                .ok_or_else(|| AdvisorError::Transport("offline".into()))
        }
    }

    fn transactions(count: usize) -> Vec<Transaction> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        (0..count)
            .map(|idx| {
                TransactionDraft::new(TransactionKind::Expense, idx as f64)
                    .with_date(start + chrono::Duration::days(idx as i64))
                    .into_transaction(format!("t{idx}"), start, &CurrencyCode::default())
            })
            .collect()
    }

    #[test]
    fn prompt_carries_fifty_most_recent_transactions() {
        let prompt = build_prompt(&transactions(60), "How am I doing?").unwrap();
        assert!(prompt.starts_with("You are a financial advisor for the 'BeigeLedger' app."));
        assert!(prompt.contains("The user is asking: \"How am I doing?\""));
        assert!(prompt.contains("\"id\":\"t59\""));
        assert!(prompt.contains("\"id\":\"t10\""));
        assert!(!prompt.contains("\"id\":\"t9\""));
        assert!(prompt.contains("\"paymentMethod\":\"Card\""));
    }

    #[test]
    fn missing_credentials_reply_is_fixed() {
        let advisor = Advisor::unconfigured("m");
        assert_eq!(advisor.analyze(&[], "hi"), MISSING_CREDENTIALS_REPLY);
    }

    #[test]
    fn transport_failure_and_empty_reply_map_to_messages() {
        let failing = Advisor::new("m", Box::new(FakeTransport::default()));
        assert_eq!(failing.analyze(&[], "hi"), TRANSPORT_FAILURE_REPLY);

        let blank = Advisor::new(
            "m",
            Box::new(FakeTransport {
                reply: Some("   ".into()),
                ..FakeTransport::default()
            }),
        );
        assert_eq!(blank.analyze(&[], "hi"), EMPTY_REPLY);
    }

    #[test]
    fn conversation_appends_note_and_records_messages() {
        let transport = FakeTransport {
            reply: Some("**Spend less** on coffee.".into()),
            ..FakeTransport::default()
        };
        let prompts = transport.prompts.clone();
        let advisor = Advisor::new("gemini-2.5-flash", Box::new(transport));
        let mut conversation = Conversation::new(CurrencyCode::new("INR"));
        assert!(conversation.messages()[0].content.contains("preferred currency is INR"));

        assert!(conversation.ask(&advisor, &transactions(2), "  ").is_none());
        let reply = conversation
            .ask(&advisor, &transactions(2), "Where does my money go?")
            .cloned()
            .unwrap();
        assert_eq!(reply.role, Role::Advisor);
        assert_eq!(reply.content, "**Spend less** on coffee.");
        assert_eq!(conversation.messages().len(), 3);

        let sent = prompts.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "gemini-2.5-flash");
        assert!(sent[0].1.contains(
            "Where does my money go? (Note: My preferred base currency is INR. Please provide analysis in this currency where possible.)"
        ));
    }
}
