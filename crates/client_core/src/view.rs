use std::fmt;

use serde::Serialize;

use crate::{dispatcher::SessionEvent, session::Session};

pub const PAGE_TITLE: &str = "Allowlist Dapp";
pub const HEADER: &str = "Welcome to Crypto Devs!";
pub const DESCRIPTION: &str = "Its an NFT collection for developers in Crypto.";
pub const IMAGE_PATH: &str = "./crypto-devs.svg";
pub const FOOTER: &str = "Made with \u{2764} by Crypto Devs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAction {
    Confirmation,
    Progress,
    Join,
    Connect,
    InstallWallet,
}

impl PrimaryAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Confirmation => "Thanks for joining the allow-list!",
            Self::Progress => "Loading...",
            Self::Join => "Join the allow-list",
            Self::Connect => "Connect wallet",
            Self::InstallWallet => "Install a wallet extension to get started",
        }
    }

    /// Event fired when the action is clicked, if it is a button.
    pub fn click_event(self) -> Option<SessionEvent> {
        match self {
            Self::Join => Some(SessionEvent::JoinClicked),
            Self::Connect => Some(SessionEvent::ConnectClicked),
            Self::Confirmation | Self::Progress | Self::InstallWallet => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub title: &'static str,
    pub header: &'static str,
    pub description: &'static str,
    pub allowlisted_count: u64,
    pub count_line: String,
    pub action: PrimaryAction,
    pub image: &'static str,
    pub footer: &'static str,
}

pub fn primary_action(session: &Session) -> PrimaryAction {
    if session.is_connected() {
        if session.is_joined {
            PrimaryAction::Confirmation
        } else if session.is_submitting {
            PrimaryAction::Progress
        } else {
            PrimaryAction::Join
        }
    } else if session.is_wallet_detected {
        PrimaryAction::Connect
    } else {
        PrimaryAction::InstallWallet
    }
}

pub fn render(session: &Session) -> View {
    View {
        title: PAGE_TITLE,
        header: HEADER,
        description: DESCRIPTION,
        allowlisted_count: session.allowlisted_count,
        count_line: format!(
            "{} have already joined the allow-list",
            session.allowlisted_count
        ),
        action: primary_action(session),
        image: IMAGE_PATH,
        footer: FOOTER,
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        writeln!(f, "{}", self.header)?;
        writeln!(f, "{}", self.description)?;
        writeln!(f, "{}", self.count_line)?;
        match self.action.click_event() {
            Some(_) => writeln!(f, "[ {} ]", self.action.label())?,
            None => writeln!(f, "{}", self.action.label())?,
        }
        writeln!(f, "<img {}>", self.image)?;
        write!(f, "{}", self.footer)
    }
}
