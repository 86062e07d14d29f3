use crate::{
    error::Result,
    models::tag::{resolve_builtin, CustomEmotionTag, EmotionTag},
    services::{PoemService, TagService},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

/// One slice of a user's emotion distribution.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmotionStat {
    pub name: String,
    pub count: u64,
    pub percentage: i64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

const FREQUENT_WORDS_LIMIT: usize = 20;
const MIN_WORD_LEN: usize = 2;

/// Particles and fillers too common in Korean text to be interesting.
const STOP_WORDS: &[&str] = &[
    "은", "는", "이", "가", "을", "를", "에", "의", "과", "와", "그", "저", "나", "너",
    "그리고", "그러나",
];

static NON_HANGUL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\u{AC00}-\u{D7A3}\s]").unwrap());

#[derive(Clone)]
pub struct AnalyticsService {
    poem_service: PoemService,
    tag_service: TagService,
}

impl AnalyticsService {
    pub async fn new(poem_service: PoemService, tag_service: TagService) -> Result<Self> {
        Ok(Self {
            poem_service,
            tag_service,
        })
    }

    /// Distribution of emotion tags across all of a user's poems.
    pub async fn emotion_stats(&self, user_id: &str) -> Result<Vec<EmotionStat>> {
        let poems = self.poem_service.get_poems_by_author(user_id).await?;
        let raw_tags: Vec<String> = poems
            .into_iter()
            .flat_map(|p| p.emotion_tags)
            .collect();
        if raw_tags.is_empty() {
            return Ok(Vec::new());
        }

        let customs = self.tag_service.get_custom_tags().await?;
        Ok(compute_emotion_stats(&raw_tags, &customs))
    }

    /// Most frequent Korean words across all of a user's poems.
    pub async fn frequent_words(&self, user_id: &str) -> Result<Vec<WordCount>> {
        let poems = self.poem_service.get_poems_by_author(user_id).await?;
        let text = poems
            .into_iter()
            .map(|p| p.content)
            .collect::<Vec<_>>()
            .join(" ");

        Ok(compute_frequent_words(&text))
    }
}

/// A tag value is either an identifier (custom tag record key) or a literal
/// name. One UUID parse decides which, then resolution happens in one place.
fn resolve_tag(raw: &str, customs: &[CustomEmotionTag]) -> Option<EmotionTag> {
    if Uuid::parse_str(raw).is_ok() {
        return customs.iter().find(|c| c.id == raw).map(|c| EmotionTag {
            id: c.id.clone(),
            name: c.name.clone(),
            color: c.color.clone(),
        });
    }

    if let Some(builtin) = resolve_builtin(raw) {
        return Some(builtin);
    }

    customs.iter().find(|c| c.name == raw).map(|c| EmotionTag {
        id: c.id.clone(),
        name: c.name.clone(),
        color: c.color.clone(),
    })
}

/// Tally raw tag values, resolve them, and turn the counts into a
/// percentage distribution that always sums to 100.
pub fn compute_emotion_stats(
    raw_tags: &[String],
    customs: &[CustomEmotionTag],
) -> Vec<EmotionStat> {
    // The denominator is every raw occurrence, resolvable or not; the
    // unresolved share is absorbed by the top entry's adjustment below.
    let total = raw_tags.len() as u64;
    if total == 0 {
        return Vec::new();
    }

    let mut raw_counts: HashMap<&str, u64> = HashMap::new();
    for raw in raw_tags {
        *raw_counts.entry(raw.as_str()).or_insert(0) += 1;
    }

    // Merge by resolved tag: a slug and its display name count as one.
    let mut resolved: HashMap<String, (EmotionTag, u64)> = HashMap::new();
    for (raw, count) in raw_counts {
        match resolve_tag(raw, customs) {
            Some(tag) => {
                resolved
                    .entry(tag.id.clone())
                    .and_modify(|(_, c)| *c += count)
                    .or_insert((tag, count));
            }
            None => warn!("Dropping unresolvable emotion tag '{}'", raw),
        }
    }

    let mut stats: Vec<EmotionStat> = resolved
        .into_values()
        .map(|(tag, count)| EmotionStat {
            name: tag.name,
            percentage: (count as f64 * 100.0 / total as f64).round() as i64,
            count,
            color: tag.color,
        })
        .collect();

    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    // Rounding can leave the sum off 100; the top entry absorbs the
    // remainder.
    let sum: i64 = stats.iter().map(|s| s.percentage).sum();
    if sum != 100 {
        if let Some(first) = stats.first_mut() {
            first.percentage += 100 - sum;
        }
    }

    stats
}

/// Strip everything but Hangul syllables, drop short tokens and stop-words,
/// and keep the 20 most frequent words.
pub fn compute_frequent_words(text: &str) -> Vec<WordCount> {
    let cleaned = NON_HANGUL.replace_all(text, "");

    let mut counts: HashMap<&str, u64> = HashMap::new();
    for token in cleaned.split_whitespace() {
        if token.chars().count() < MIN_WORD_LEN || STOP_WORDS.contains(&token) {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut words: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount {
            word: word.to_string(),
            count,
        })
        .collect();

    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(FREQUENT_WORDS_LIMIT);
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn emotion_stats_round_and_order() {
        let stats = compute_emotion_stats(&tags(&["joy", "joy", "sad"]), &[]);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "기쁨");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].percentage, 67);
        assert_eq!(stats[1].name, "슬픔");
        assert_eq!(stats[1].count, 1);
        assert_eq!(stats[1].percentage, 33);
    }

    #[test]
    fn emotion_stats_percentages_sum_to_100() {
        // 3 × 33 rounds to 99; the top entry absorbs the extra point.
        let stats = compute_emotion_stats(&tags(&["joy", "sad", "anger"]), &[]);

        assert_eq!(stats.iter().map(|s| s.percentage).sum::<i64>(), 100);
        assert_eq!(stats[0].percentage, 34);
        assert_eq!(stats[1].percentage, 33);
        assert_eq!(stats[2].percentage, 33);
    }

    #[test]
    fn emotion_stats_merges_slug_and_display_name() {
        let stats = compute_emotion_stats(&tags(&["joy", "기쁨"]), &[]);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].percentage, 100);
    }

    #[test]
    fn emotion_stats_resolves_custom_tags_by_id_and_name() {
        let custom = CustomEmotionTag {
            id: "2b1c8c5a-4d87-4c52-a64e-9a7f64f27ab1".to_string(),
            name: "몽글몽글".to_string(),
            color: "#808080".to_string(),
            created_at: Utc::now(),
        };

        let stats = compute_emotion_stats(
            &tags(&["2b1c8c5a-4d87-4c52-a64e-9a7f64f27ab1", "몽글몽글"]),
            &[custom],
        );

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "몽글몽글");
        assert_eq!(stats[0].count, 2);
    }

    #[test]
    fn emotion_stats_drops_unresolvable_values() {
        let stats = compute_emotion_stats(&tags(&["joy", "not-a-tag"]), &[]);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "기쁨");
        assert_eq!(stats[0].percentage, 100);
    }

    #[test]
    fn unresolved_tags_stay_in_the_denominator() {
        // 6 raw occurrences, half unresolvable: joy is 2/6 → 33 and sad
        // 1/6 → 17 before the top entry absorbs the remaining 50 points.
        let stats = compute_emotion_stats(&tags(&["joy", "joy", "sad", "x", "x", "x"]), &[]);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "기쁨");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].percentage, 83);
        assert_eq!(stats[1].name, "슬픔");
        assert_eq!(stats[1].count, 1);
        assert_eq!(stats[1].percentage, 17);
        assert_eq!(stats.iter().map(|s| s.percentage).sum::<i64>(), 100);
    }

    #[test]
    fn emotion_stats_empty_input_yields_empty_output() {
        assert!(compute_emotion_stats(&[], &[]).is_empty());
        assert!(compute_emotion_stats(&tags(&["not-a-tag"]), &[]).is_empty());
    }

    #[test]
    fn frequent_words_counts_repeated_word() {
        let words = compute_frequent_words("나는 너를 사랑해 사랑해 사랑해");

        assert_eq!(words[0], WordCount { word: "사랑해".to_string(), count: 3 });
    }

    #[test]
    fn frequent_words_filters_short_tokens_and_stop_words() {
        let words = compute_frequent_words("그리고 봄 바람이 분다 바람이");

        assert!(words.iter().all(|w| w.word != "그리고"));
        assert!(words.iter().all(|w| w.word != "봄"));
        assert_eq!(words[0], WordCount { word: "바람이".to_string(), count: 2 });
    }

    #[test]
    fn frequent_words_strips_non_hangul() {
        let words = compute_frequent_words("hello 123 바람!소리 ,,,");

        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "바람소리");
    }

    #[test]
    fn frequent_words_caps_at_twenty_sorted_descending() {
        let first = ["가", "나", "다", "라", "마"];
        let second = ["바", "사", "아", "자", "차"];
        let mut pieces = Vec::new();
        for (i, a) in first.iter().enumerate() {
            for (j, b) in second.iter().enumerate() {
                // 25 distinct two-syllable words with distinct counts
                for _ in 0..(i * 5 + j + 1) {
                    pieces.push(format!("{}{}", a, b));
                }
            }
        }
        let words = compute_frequent_words(&pieces.join(" "));

        assert_eq!(words.len(), 20);
        assert!(words.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn frequent_words_empty_input() {
        assert!(compute_frequent_words("").is_empty());
        assert!(compute_frequent_words("a b c 1 2 3").is_empty());
    }
}
