use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::merge::FeedItem;

/// A match from the fixtures or results feed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub date: NaiveDate,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(default)]
    pub time_label: Option<String>,
    #[serde(default)]
    pub kick_off_time: Option<String>,
    #[serde(default)]
    pub friendly_date_time: Option<String>,
    #[serde(default)]
    pub tv_info: Option<TvInfo>,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Team {
    pub names: TeamNames,
    #[serde(default)]
    pub score: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamNames {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TvInfo {
    #[serde(default)]
    pub channel_info: Option<ChannelInfo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    #[serde(default)]
    pub full_name: Option<serde_json::Value>,
}

impl FeedItem for Match {
    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn schedule_label(&self) -> Option<&str> {
        self.friendly_date_time.as_deref().filter(|l| !l.is_empty())
    }
}

impl Match {
    pub fn home_name(&self) -> &str {
        &self.home_team.names.display_name
    }

    pub fn away_name(&self) -> &str {
        &self.away_team.names.display_name
    }

    /// In-play label when present, otherwise the kick-off time.
    pub fn match_time(&self) -> Option<&str> {
        self.time_label
            .as_deref()
            .filter(|l| !l.is_empty())
            .or(self.kick_off_time.as_deref())
    }

    /// Channel name when the feed carries a string one.
    pub fn channel_name(&self) -> Option<&str> {
        self.tv_info
            .as_ref()?
            .channel_info
            .as_ref()?
            .full_name
            .as_ref()?
            .as_str()
            .filter(|name| !name.is_empty())
    }

    pub fn home_score(&self) -> Option<i64> {
        self.visible_score(self.home_team.score)
    }

    pub fn away_score(&self) -> Option<i64> {
        self.visible_score(self.away_team.score)
    }

    fn visible_score(&self, score: Option<i64>) -> Option<i64> {
        if self.started || self.finished {
            score.filter(|s| *s >= 0)
        } else {
            None
        }
    }
}

fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Team names that stand for an undecided side ("Winner QF1", "Spain/Italy", "TBD").
/// They have no logo upstream.
#[must_use]
pub fn is_placeholder_team(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.contains('/')
        || trimmed.contains("Winner")
        || trimmed.contains("Loser")
        || trimmed.eq_ignore_ascii_case("TBD")
        || trimmed.eq_ignore_ascii_case("TBC")
}

/// Short display form: "Spain/Italy" becomes "Spa/Ita", winner/loser placeholders "TBC".
#[must_use]
pub fn display_team_name(name: &str) -> String {
    if let Some((first, second)) = name.split_once('/') {
        let head: String = first.chars().take(3).collect();
        let tail: String = second.chars().take(3).collect();
        return format!("{head}/{tail}");
    }
    if name.contains("Winner") || name.contains("Loser") {
        return "TBC".to_string();
    }
    name.to_string()
}

#[must_use]
pub fn abbreviate_channel(name: &str) -> String {
    name.replace("One", "1")
        .replace("Two", "2")
        .replace("Three", "3")
        .replace("Four", "4")
        .replace("Channel 4", "Ch 4")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(json: serde_json::Value) -> Match {
        serde_json::from_value(json).expect("valid match fixture")
    }

    fn base_json() -> serde_json::Value {
        serde_json::json!({
            "id": 42,
            "date": "2024-06-10",
            "homeTeam": { "names": { "displayName": "Arsenal" }, "score": 2 },
            "awayTeam": { "names": { "displayName": "Chelsea" }, "score": 0 },
            "kickOffTime": "15:00",
            "friendlyDateTime": "Today"
        })
    }

    #[test]
    fn numeric_and_text_ids_deserialize() {
        assert_eq!(sample(base_json()).id, "42");
        let mut json = base_json();
        json["id"] = serde_json::json!("abc");
        assert_eq!(sample(json).id, "abc");
    }

    #[test]
    fn score_hidden_until_started() {
        let m = sample(base_json());
        assert_eq!(m.home_score(), None);

        let mut json = base_json();
        json["started"] = serde_json::json!(true);
        let m = sample(json);
        assert_eq!(m.home_score(), Some(2));
        assert_eq!(m.away_score(), Some(0));
    }

    #[test]
    fn match_time_prefers_in_play_label() {
        let mut json = base_json();
        json["timeLabel"] = serde_json::json!("HT");
        assert_eq!(sample(json).match_time(), Some("HT"));
        assert_eq!(sample(base_json()).match_time(), Some("15:00"));
    }

    #[test]
    fn channel_name_requires_string() {
        let mut json = base_json();
        json["tvInfo"] = serde_json::json!({ "channelInfo": { "fullName": 7 } });
        assert_eq!(sample(json).channel_name(), None);

        let mut json = base_json();
        json["tvInfo"] = serde_json::json!({ "channelInfo": { "fullName": "BBC One" } });
        assert_eq!(sample(json).channel_name(), Some("BBC One"));
    }

    #[test]
    fn placeholder_teams_detected() {
        assert!(is_placeholder_team("Winner QF1"));
        assert!(is_placeholder_team("Loser SF2"));
        assert!(is_placeholder_team("Spain/Italy"));
        assert!(is_placeholder_team("TBD"));
        assert!(!is_placeholder_team("Arsenal"));
    }

    #[test]
    fn display_names_shorten_placeholders() {
        assert_eq!(display_team_name("Spain/Italy"), "Spa/Ita");
        assert_eq!(display_team_name("Winner QF1"), "TBC");
        assert_eq!(display_team_name("Arsenal"), "Arsenal");
    }

    #[test]
    fn channel_abbreviations() {
        assert_eq!(abbreviate_channel("BBC One"), "BBC 1");
        assert_eq!(abbreviate_channel("ITV Four"), "ITV 4");
        assert_eq!(abbreviate_channel("Channel 4"), "Ch 4");
    }
}
