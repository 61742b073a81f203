use chrono::{Datelike, NaiveDate};

use crate::config::{AppConfig, ConversationConfig, TriggerPolicy};
use crate::parse::{parse_date_range, parse_guest_count};
use crate::pricing::RateTable;
use crate::reply;
use crate::session::{SessionStage, SessionStore};

/// Drives the quote conversation for every user. The transport collaborator
/// hands in plain text plus a user id and delivers whatever string comes back;
/// everything else — parsing, pricing, session bookkeeping — happens here,
/// synchronously and without I/O.
pub struct ConversationEngine<S> {
    rates: RateTable,
    settings: ConversationConfig,
    store: S,
}

impl<S> ConversationEngine<S>
where
    S: SessionStore,
{
    pub fn new(rates: RateTable, settings: ConversationConfig, store: S) -> Self {
        Self { rates, settings, store }
    }

    pub fn from_config(config: &AppConfig, store: S) -> Self {
        Self::new(config.pricing.rate_table(), config.conversation.clone(), store)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handles one inbound message. Returns the reply to deliver, or `None`
    /// for inputs no transition answers. Stage read and write happen under a
    /// single per-user atomic update, so a double-sending user cannot lose a
    /// transition.
    pub fn handle_message(&self, user_id: &str, text: &str) -> Option<String> {
        self.handle_message_on(user_id, text, chrono::Local::now().date_naive())
    }

    /// Same as [`handle_message`](Self::handle_message) with an explicit
    /// "today", which anchors the year of year-less date expressions.
    pub fn handle_message_on(&self, user_id: &str, text: &str, today: NaiveDate) -> Option<String> {
        self.store.update_with(user_id, |stage| {
            let from_stage = stage.name();
            let (next, reply) = transition(stage, text, today, &self.rates, &self.settings);

            tracing::debug!(
                event_name = "conversation.transition",
                user_id,
                from_stage,
                to_stage = next.name(),
                replied = reply.is_some(),
                "conversation transition applied"
            );

            (next, reply)
        })
    }
}

/// The transition table: `(stage, input) -> (next stage, reply)`. Pure, so the
/// whole conversation contract is testable without a store.
fn transition(
    stage: SessionStage,
    text: &str,
    today: NaiveDate,
    rates: &RateTable,
    settings: &ConversationConfig,
) -> (SessionStage, Option<String>) {
    let input = text.trim();
    let is_trigger = input == settings.trigger_keyword;
    let restart_wins = is_trigger && settings.trigger_policy == TriggerPolicy::Restart;

    match stage {
        SessionStage::Initial => {
            if is_trigger {
                (SessionStage::AwaitingDate, Some(reply::date_prompt()))
            } else {
                (SessionStage::Initial, Some(reply::greeting(&settings.trigger_keyword)))
            }
        }

        SessionStage::AwaitingDate => {
            if restart_wins {
                return (SessionStage::AwaitingDate, Some(reply::date_prompt()));
            }
            match parse_date_range(input, today.year()) {
                Ok(range) => {
                    (SessionStage::AwaitingGuests { range }, Some(reply::guest_prompt(range)))
                }
                Err(_) => (SessionStage::AwaitingDate, Some(reply::date_retry())),
            }
        }

        SessionStage::AwaitingGuests { range } => {
            if restart_wins {
                return (SessionStage::AwaitingDate, Some(reply::date_prompt()));
            }
            match parse_guest_count(input) {
                Ok(guests) => match rates.quote(range, guests) {
                    Ok(quote) => {
                        let rendered = reply::quote_reply(
                            &quote,
                            &settings.trigger_keyword,
                            &settings.booking_keyword,
                        );
                        (SessionStage::QuoteProvided { quote }, Some(rendered))
                    }
                    Err(_) => (
                        SessionStage::AwaitingGuests { range },
                        Some(reply::guest_uncovered_retry()),
                    ),
                },
                Err(_) => (SessionStage::AwaitingGuests { range }, Some(reply::guest_retry())),
            }
        }

        SessionStage::QuoteProvided { quote } => {
            if input == settings.booking_keyword {
                let confirmation = reply::booking_confirmation(&quote);
                return (SessionStage::Initial, Some(confirmation));
            }
            if restart_wins {
                return (SessionStage::AwaitingDate, Some(reply::date_prompt()));
            }
            // No transition answers other input here; stay put and say nothing.
            (SessionStage::QuoteProvided { quote }, None)
        }
    }
}
