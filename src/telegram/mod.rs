use crate::alerts::Notifier;
use crate::config::{MarkupMode, TelegramConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::info;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, Recipient};

/// Chat ids are numeric (`-100...` for channels); anything else is taken
/// as a public channel username.
pub fn parse_recipient(chat_id: &str) -> Result<Recipient> {
    let chat_id = chat_id.trim();
    if chat_id.is_empty() {
        return Err(Error::ConfigError("telegram chat_id is empty".into()));
    }
    match chat_id.parse::<i64>() {
        Ok(id) => Ok(Recipient::Id(ChatId(id))),
        Err(_) => {
            let username = if chat_id.starts_with('@') {
                chat_id.to_string()
            } else {
                format!("@{}", chat_id)
            };
            Ok(Recipient::ChannelUsername(username))
        }
    }
}

pub fn parse_mode(mode: MarkupMode) -> Option<ParseMode> {
    match mode {
        MarkupMode::Plain => None,
        MarkupMode::Html => Some(ParseMode::Html),
        MarkupMode::Markdown => Some(ParseMode::MarkdownV2),
    }
}

pub struct TelegramNotifier {
    bot: Bot,
    recipient: Recipient,
    parse_mode: Option<ParseMode>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        if config.bot_token.trim().is_empty() {
            return Err(Error::ConfigError("telegram bot_token is empty".into()));
        }
        Ok(Self {
            bot: Bot::new(config.bot_token.trim()),
            recipient: parse_recipient(&config.chat_id)?,
            parse_mode: parse_mode(config.parse_mode),
        })
    }

    /// Checks the token against the Bot API.
    pub async fn initialize(&self) -> Result<()> {
        let me = self.bot.get_me().await?;
        info!("Telegram bot initialized: @{}", me.username());
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let mut request = self.bot.send_message(self.recipient.clone(), text);
        if let Some(mode) = self.parse_mode {
            request = request.parse_mode(mode);
        }
        request.await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipient() -> Result<()> {
        assert_eq!(parse_recipient("-1001234")?, Recipient::Id(ChatId(-1001234)));
        assert_eq!(
            parse_recipient("@sniper_alerts")?,
            Recipient::ChannelUsername("@sniper_alerts".to_string())
        );
        assert_eq!(
            parse_recipient("sniper_alerts")?,
            Recipient::ChannelUsername("@sniper_alerts".to_string())
        );
        assert!(parse_recipient("  ").is_err());
        Ok(())
    }

    #[test]
    fn test_parse_mode_mapping() {
        assert_eq!(parse_mode(MarkupMode::Plain), None);
        assert_eq!(parse_mode(MarkupMode::Html), Some(ParseMode::Html));
        assert_eq!(parse_mode(MarkupMode::Markdown), Some(ParseMode::MarkdownV2));
    }

    #[test]
    fn test_notifier_requires_token() {
        let config = TelegramConfig {
            enabled: true,
            bot_token: String::new(),
            chat_id: "123".to_string(),
            parse_mode: MarkupMode::Html,
            startup_message: false,
        };
        assert!(matches!(TelegramNotifier::new(&config), Err(Error::ConfigError(_))));

        let config = TelegramConfig {
            bot_token: "123:abc".to_string(),
            ..config
        };
        let notifier = TelegramNotifier::new(&config).unwrap();
        assert_eq!(notifier.recipient, Recipient::Id(ChatId(123)));
        assert_eq!(notifier.parse_mode, Some(ParseMode::Html));
    }
}
