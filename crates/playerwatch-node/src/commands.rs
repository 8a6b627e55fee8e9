//! Management and query commands.
//!
//! Commands arrive as JSON objects tagged by `cmd` and answer with a
//! [`Response`] tagged by `status`. Replies carry the same wording the chat
//! client shows its user.

use crate::state::SocialState;
use playerwatch_registry::{is_valid_name, Color, FlagKind, LinkOutcome};
use serde::{Deserialize, Serialize};

/// Command accepted by the node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Flag a player as scary
    ScaryAdd { player: String },
    /// Unflag a scary player
    ScaryRemove { player: String },
    /// List scary players
    ScaryList,
    /// Flag a player as blacklisted
    BlacklistAdd { player: String },
    /// Unflag a blacklisted player
    BlacklistRemove { player: String },
    /// List blacklisted players
    BlacklistList,
    /// Link two accounts as the same person
    AltLink { main: String, alt: String },
    /// Remove a player from its alt group
    AltUnlink { player: String },
    /// List alt groups
    AltList,
    /// Count online players tracked as alts
    OnlineAlts,
    /// Report scary players in the roster
    ScaryAlert,
    /// Replace the online roster
    UpdateRoster {
        players: Vec<String>,
        #[serde(default)]
        self_name: Option<String>,
    },
    /// Classify a player
    Resolve {
        player: String,
        #[serde(default)]
        is_self: Option<bool>,
        #[serde(default)]
        default_color: Option<Color>,
        #[serde(default)]
        team_color: Option<Color>,
    },
    /// Complete a player name
    Suggest {
        source: SuggestSource,
        #[serde(default)]
        prefix: String,
    },
    /// Ping (health check)
    Ping,
}

/// Where name suggestions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestSource {
    /// The online roster
    Online,
    Scary,
    Blacklisted,
    /// Every name tracked in an alt group
    Alts,
}

/// Response to a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok {
        message: String,
    },
    Error {
        error: String,
    },
    List {
        title: String,
        items: Vec<String>,
    },
    Classification {
        label: String,
        color: Color,
        display: String,
        radar: String,
    },
    Pong,
}

impl Response {
    fn ok(message: impl Into<String>) -> Self {
        Response::Ok {
            message: message.into(),
        }
    }

    fn error(error: impl Into<String>) -> Self {
        Response::Error {
            error: error.into(),
        }
    }
}

/// Execute `cmd` against `state`.
pub fn execute_command(cmd: Command, state: &mut SocialState) -> Response {
    match cmd {
        Command::ScaryAdd { player } => add_flag(state, FlagKind::Scary, &player),
        Command::ScaryRemove { player } => remove_flag(state, FlagKind::Scary, &player),
        Command::ScaryList => list_flags(state, FlagKind::Scary),
        Command::BlacklistAdd { player } => add_flag(state, FlagKind::Blacklisted, &player),
        Command::BlacklistRemove { player } => remove_flag(state, FlagKind::Blacklisted, &player),
        Command::BlacklistList => list_flags(state, FlagKind::Blacklisted),

        Command::AltLink { main, alt } => link_alts(state, &main, &alt),

        Command::AltUnlink { player } => {
            if state.alts.unlink_account(&player) {
                tracing::info!("Unlinked {} from its alt group", player);
                Response::ok(format!("Unlinked {} from its alt group", player))
            } else {
                Response::error(format!("Player {} is not being tracked", player))
            }
        }

        Command::AltList => {
            if state.alts.is_empty() {
                return Response::ok("No alt accounts are being tracked.");
            }
            let items = state
                .alts
                .iter()
                .map(|group| {
                    if group.alts().is_empty() {
                        group.main().to_string()
                    } else {
                        let alts: Vec<&str> = group.alts().iter().map(String::as_str).collect();
                        format!("{} -> {}", group.main(), alts.join(", "))
                    }
                })
                .collect();
            Response::List {
                title: format!(
                    "Alt Groups ({} groups, {} total players)",
                    state.alts.count(),
                    state.alts.total_tracked_players()
                ),
                items,
            }
        }

        Command::OnlineAlts => {
            if state.roster.is_empty() {
                return Response::error("No online roster has been received.");
            }
            let summary = state
                .alts
                .online_alt_summary(&state.roster, state.self_name.as_deref());
            let title = if summary.online_alts == 0 {
                format!(
                    "0/{} players online are tracked as alt accounts.",
                    summary.total_players
                )
            } else {
                format!(
                    "Found {}/{} players online are tracked as alt accounts. These belong to {} unique main account(s).",
                    summary.online_alts,
                    summary.total_players,
                    summary.mains.len()
                )
            };
            Response::List {
                title,
                items: summary.mains.into_iter().collect(),
            }
        }

        Command::ScaryAlert => {
            let items: Vec<String> = state
                .scary
                .flagged_among(&state.roster)
                .into_iter()
                .filter(|name| !state.is_self(name))
                .map(|name| format!("Scary person detected: {}", name))
                .collect();
            for alert in &items {
                tracing::warn!("{}", alert);
            }
            Response::List {
                title: format!("Scary Alert ({})", items.len()),
                items,
            }
        }

        Command::UpdateRoster { players, self_name } => {
            state.update_roster(players, self_name);
            Response::ok(format!("Roster updated: {} players online", state.roster.len()))
        }

        Command::Resolve {
            player,
            is_self,
            default_color,
            team_color,
        } => {
            let is_self = is_self.unwrap_or_else(|| state.is_self(&player));
            let resolver = state.resolver();
            let classification =
                resolver.resolve(&player, is_self, default_color.unwrap_or(Color::WHITE), team_color);
            Response::Classification {
                label: classification.label().to_string(),
                color: classification.color,
                display: resolver.tab_display_name(&player, is_self, &state.roster),
                radar: resolver.radar_label(&player, is_self),
            }
        }

        Command::Suggest { source, prefix } => Response::List {
            title: "Suggestions".to_string(),
            items: suggest(state, source, &prefix),
        },

        Command::Ping => Response::Pong,
    }
}

fn add_flag(state: &mut SocialState, kind: FlagKind, player: &str) -> Response {
    if !is_valid_name(player) {
        return Response::error(format!("Invalid player name: {:?}", player));
    }
    if state.flags_mut(kind).add(player) {
        tracing::info!("Added {} to {}", player, kind.title());
        Response::ok(format!("Added {} to {}.", player, kind.title()))
    } else {
        Response::error(already_flagged(kind))
    }
}

fn remove_flag(state: &mut SocialState, kind: FlagKind, player: &str) -> Response {
    if state.flags_mut(kind).remove(player) {
        tracing::info!("Removed {} from {}", player, kind.title());
        Response::ok(format!("Removed {} from {}.", player, kind.title()))
    } else {
        Response::error(not_flagged(kind))
    }
}

fn list_flags(state: &SocialState, kind: FlagKind) -> Response {
    let registry = state.flags(kind);
    let title = match kind {
        FlagKind::Scary => "Scary People",
        FlagKind::Blacklisted => "Blacklisted People",
    };
    Response::List {
        title: format!("{} ({})", title, registry.count()),
        items: registry.iter().map(|p| p.name().to_string()).collect(),
    }
}

fn already_flagged(kind: FlagKind) -> &'static str {
    match kind {
        FlagKind::Scary => "Already marked as scary.",
        FlagKind::Blacklisted => "Already blacklisted.",
    }
}

fn not_flagged(kind: FlagKind) -> &'static str {
    match kind {
        FlagKind::Scary => "Not marked as scary.",
        FlagKind::Blacklisted => "Not blacklisted.",
    }
}

fn link_alts(state: &mut SocialState, main: &str, alt: &str) -> Response {
    match state.alts.link(main, alt) {
        LinkOutcome::Created { main, alt } | LinkOutcome::Joined { alt, main } => {
            tracing::info!("Linked {} as an alt of {}", alt, main);
            Response::ok(format!("{} has been linked as an alt of {}", alt, main))
        }
        LinkOutcome::Merged { main, absorbed } => {
            tracing::info!("Merged alt group {} into {}", absorbed, main);
            Response::ok(format!(
                "Alt groups of {} and {} have been merged",
                main, absorbed
            ))
        }
        LinkOutcome::AlreadyLinked => Response::error(format!(
            "Players {} and {} are already linked.",
            main, alt
        )),
        LinkOutcome::Invalid => Response::error(format!(
            "Cannot link {} and {}: names must be distinct and contain no whitespace.",
            main, alt
        )),
    }
}

/// Candidates from `source` starting with `prefix`, ignoring case.
fn suggest(state: &SocialState, source: SuggestSource, prefix: &str) -> Vec<String> {
    let prefix = prefix.to_lowercase();
    let candidates: Vec<&str> = match source {
        SuggestSource::Online => state.roster.iter().map(String::as_str).collect(),
        SuggestSource::Scary => state.scary.iter().map(|p| p.name()).collect(),
        SuggestSource::Blacklisted => state.blacklisted.iter().map(|p| p.name()).collect(),
        SuggestSource::Alts => state.alts.tracked_names().collect(),
    };
    candidates
        .into_iter()
        .filter(|name| name.to_lowercase().starts_with(&prefix))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use playerwatch_registry::{HighlightConfig, MemoryStore};
    use std::sync::Arc;

    fn state() -> SocialState {
        SocialState::load(Arc::new(MemoryStore::new()), None, HighlightConfig::default()).unwrap()
    }

    fn run(state: &mut SocialState, json: &str) -> Response {
        let cmd: Command = serde_json::from_str(json).unwrap();
        execute_command(cmd, state)
    }

    fn items(response: Response) -> Vec<String> {
        match response {
            Response::List { items, .. } => items,
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn parses_tagged_commands() {
        let cmd: Command = serde_json::from_str(r#"{"cmd":"alt_link","main":"A","alt":"B"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::AltLink {
                main: "A".into(),
                alt: "B".into()
            }
        );
        let cmd: Command = serde_json::from_str(r#"{"cmd":"suggest","source":"alts"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Suggest {
                source: SuggestSource::Alts,
                prefix: String::new()
            }
        );
        assert!(serde_json::from_str::<Command>(r#"{"cmd":"explode"}"#).is_err());
    }

    #[test]
    fn scary_add_and_remove() {
        let mut state = state();
        assert_eq!(
            run(&mut state, r#"{"cmd":"scary_add","player":"Steve"}"#),
            Response::ok("Added Steve to scary people.")
        );
        assert_eq!(
            run(&mut state, r#"{"cmd":"scary_add","player":"Steve"}"#),
            Response::error("Already marked as scary.")
        );
        assert_eq!(
            run(&mut state, r#"{"cmd":"scary_list"}"#),
            Response::List {
                title: "Scary People (1)".into(),
                items: vec!["Steve".into()]
            }
        );
        assert_eq!(
            run(&mut state, r#"{"cmd":"scary_remove","player":"Steve"}"#),
            Response::ok("Removed Steve from scary people.")
        );
        assert_eq!(
            run(&mut state, r#"{"cmd":"scary_remove","player":"Steve"}"#),
            Response::error("Not marked as scary.")
        );
    }

    #[test]
    fn blacklist_rejects_invalid_names() {
        let mut state = state();
        assert_eq!(
            run(&mut state, r#"{"cmd":"blacklist_add","player":"two words"}"#),
            Response::error("Invalid player name: \"two words\"")
        );
        assert!(state.blacklisted.is_empty());
        run(&mut state, r#"{"cmd":"blacklist_add","player":"Griefer"}"#);
        assert_eq!(
            run(&mut state, r#"{"cmd":"blacklist_add","player":"Griefer"}"#),
            Response::error("Already blacklisted.")
        );
        assert_eq!(
            run(&mut state, r#"{"cmd":"blacklist_remove","player":"Nobody"}"#),
            Response::error("Not blacklisted.")
        );
    }

    #[test]
    fn link_messages_follow_outcome() {
        let mut state = state();
        assert_eq!(
            run(&mut state, r#"{"cmd":"alt_link","main":"Alice","alt":"Bob"}"#),
            Response::ok("Bob has been linked as an alt of Alice")
        );
        assert_eq!(
            run(&mut state, r#"{"cmd":"alt_link","main":"Carl","alt":"Bob"}"#),
            Response::ok("Carl has been linked as an alt of Alice")
        );
        assert_eq!(
            run(&mut state, r#"{"cmd":"alt_link","main":"Bob","alt":"Alice"}"#),
            Response::error("Players Bob and Alice are already linked.")
        );

        run(&mut state, r#"{"cmd":"alt_link","main":"Dan","alt":"Eve"}"#);
        assert_eq!(
            run(&mut state, r#"{"cmd":"alt_link","main":"Alice","alt":"Eve"}"#),
            Response::ok("Alt groups of Alice and Dan have been merged")
        );
        assert_eq!(state.alts.count(), 1);
        assert_eq!(state.alts.total_tracked_players(), 5);

        assert!(matches!(
            run(&mut state, r#"{"cmd":"alt_link","main":"Alice","alt":"Alice"}"#),
            Response::Error { .. }
        ));
    }

    #[test]
    fn unlink_and_list() {
        let mut state = state();
        assert_eq!(
            run(&mut state, r#"{"cmd":"alt_list"}"#),
            Response::ok("No alt accounts are being tracked.")
        );

        run(&mut state, r#"{"cmd":"alt_link","main":"Alice","alt":"Bob"}"#);
        run(&mut state, r#"{"cmd":"alt_link","main":"Alice","alt":"Carl"}"#);
        assert_eq!(
            run(&mut state, r#"{"cmd":"alt_list"}"#),
            Response::List {
                title: "Alt Groups (1 groups, 3 total players)".into(),
                items: vec!["Alice -> Bob, Carl".into()]
            }
        );

        assert_eq!(
            run(&mut state, r#"{"cmd":"alt_unlink","player":"Alice"}"#),
            Response::ok("Unlinked Alice from its alt group")
        );
        assert_eq!(state.alts.main_account_for("Carl"), "Bob");
        assert_eq!(
            run(&mut state, r#"{"cmd":"alt_unlink","player":"Alice"}"#),
            Response::error("Player Alice is not being tracked")
        );
    }

    #[test]
    fn online_alts_counts_roster() {
        let mut state = state();
        assert!(matches!(run(&mut state, r#"{"cmd":"online_alts"}"#), Response::Error { .. }));

        run(&mut state, r#"{"cmd":"alt_link","main":"Alice","alt":"Bob"}"#);
        run(
            &mut state,
            r#"{"cmd":"update_roster","players":["Me","Alice","Zed"],"self_name":"Me"}"#,
        );
        assert_eq!(
            run(&mut state, r#"{"cmd":"online_alts"}"#),
            Response::List {
                title: "0/3 players online are tracked as alt accounts.".into(),
                items: vec![]
            }
        );

        run(
            &mut state,
            r#"{"cmd":"update_roster","players":["Me","Alice","Bob","Zed"]}"#,
        );
        assert_eq!(
            run(&mut state, r#"{"cmd":"online_alts"}"#),
            Response::List {
                title: "Found 1/4 players online are tracked as alt accounts. These belong to 1 unique main account(s).".into(),
                items: vec!["Alice".into()]
            }
        );
    }

    #[test]
    fn scary_alert_skips_self() {
        let mut state = state();
        run(&mut state, r#"{"cmd":"scary_add","player":"Steve"}"#);
        run(&mut state, r#"{"cmd":"scary_add","player":"Me"}"#);
        run(
            &mut state,
            r#"{"cmd":"update_roster","players":["Me","Steve","Alex"],"self_name":"Me"}"#,
        );

        assert_eq!(
            run(&mut state, r#"{"cmd":"scary_alert"}"#),
            Response::List {
                title: "Scary Alert (1)".into(),
                items: vec!["Scary person detected: Steve".into()]
            }
        );
    }

    #[test]
    fn resolve_reports_tier_and_labels() {
        let mut state = state();
        run(&mut state, r#"{"cmd":"scary_add","player":"Steve"}"#);
        run(&mut state, r#"{"cmd":"blacklist_add","player":"Steve"}"#);
        run(&mut state, r#"{"cmd":"alt_link","main":"Alice","alt":"Bob"}"#);
        run(
            &mut state,
            r#"{"cmd":"update_roster","players":["Me","Alice","Bob"],"self_name":"Me"}"#,
        );

        assert_eq!(
            run(&mut state, r#"{"cmd":"resolve","player":"Steve"}"#),
            Response::Classification {
                label: "Scary".into(),
                color: Color::DEFAULT_SCARY,
                display: "Steve".into(),
                radar: "Steve [Scary]".into(),
            }
        );
        assert_eq!(
            run(&mut state, r#"{"cmd":"resolve","player":"Alice"}"#),
            Response::Classification {
                label: "Alt".into(),
                color: Color::DEFAULT_ALT,
                display: "Alice (+1)".into(),
                radar: "Alice [Alt]".into(),
            }
        );

        let me = run(&mut state, r#"{"cmd":"resolve","player":"Me"}"#);
        assert!(matches!(me, Response::Classification { ref label, .. } if label == "Self"));

        let team = run(
            &mut state,
            r#"{"cmd":"resolve","player":"Zed","team_color":{"r":10,"g":20,"b":30}}"#,
        );
        assert_eq!(
            team,
            Response::Classification {
                label: "Player".into(),
                color: Color::rgb(10, 20, 30),
                display: "Zed".into(),
                radar: "Zed".into(),
            }
        );
    }

    #[test]
    fn suggestions_match_prefix_ignoring_case() {
        let mut state = state();
        run(&mut state, r#"{"cmd":"scary_add","player":"Steve"}"#);
        run(&mut state, r#"{"cmd":"scary_add","player":"stan"}"#);
        run(&mut state, r#"{"cmd":"scary_add","player":"Alex"}"#);
        run(&mut state, r#"{"cmd":"alt_link","main":"Sam","alt":"Bob"}"#);
        run(&mut state, r#"{"cmd":"update_roster","players":["Sally","Bob"]}"#);

        assert_eq!(
            items(run(&mut state, r#"{"cmd":"suggest","source":"scary","prefix":"ST"}"#)),
            vec!["Steve".to_string(), "stan".to_string()]
        );
        assert_eq!(
            items(run(&mut state, r#"{"cmd":"suggest","source":"online","prefix":"s"}"#)),
            vec!["Sally".to_string()]
        );
        assert_eq!(
            items(run(&mut state, r#"{"cmd":"suggest","source":"alts","prefix":"b"}"#)),
            vec!["Bob".to_string()]
        );
        assert!(items(run(&mut state, r#"{"cmd":"suggest","source":"blacklisted"}"#)).is_empty());
    }

    #[test]
    fn ping_pongs() {
        let mut state = state();
        assert_eq!(run(&mut state, r#"{"cmd":"ping"}"#), Response::Pong);
        assert_eq!(
            serde_json::to_string(&Response::Pong).unwrap(),
            r#"{"status":"pong"}"#
        );
    }
}
