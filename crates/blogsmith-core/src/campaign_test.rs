use chrono::{NaiveDate, NaiveTime};

use super::*;

/// A fully valid weekly campaign configuration to mutate per test.
fn settings() -> CampaignSettings {
    CampaignSettings {
        name: "Spring Garden Guides".to_string(),
        description: Some("Weekly planting guides".to_string()),
        frequency: Frequency::Weekly,
        schedule_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        schedule_day: Some(1),
        start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        end_date: None,
        max_runs: None,
        topic: "sustainable gardening".to_string(),
        keywords: vec!["raised beds".to_string(), "composting".to_string()],
        word_count_min: 800,
        word_count_max: 1200,
        writing_style: "informative".to_string(),
        tone: "friendly".to_string(),
        content_structure: None,
        language: "en".to_string(),
        internal_linking: true,
        max_internal_links: 5,
        image_integration: false,
        product_links: true,
        seo_optimization: true,
        auto_publish: false,
    }
}

#[test]
fn validate_accepts_valid_settings() {
    assert!(settings().validate().is_ok());
}

#[test]
fn validate_rejects_empty_name() {
    let mut s = settings();
    s.name = "   ".to_string();
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::EmptyName)
    ));
}

#[test]
fn validate_rejects_missing_weekly_schedule_day() {
    let mut s = settings();
    s.schedule_day = None;
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::MissingScheduleDay {
            frequency: Frequency::Weekly
        })
    ));
}

#[test]
fn validate_rejects_weekday_out_of_range() {
    let mut s = settings();
    s.schedule_day = Some(7);
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::ScheduleDayOutOfRange { day: 7, .. })
    ));
}

#[test]
fn validate_accepts_biweekly_saturday() {
    let mut s = settings();
    s.frequency = Frequency::Biweekly;
    s.schedule_day = Some(6);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_missing_monthly_schedule_day() {
    let mut s = settings();
    s.frequency = Frequency::Monthly;
    s.schedule_day = None;
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::MissingScheduleDay {
            frequency: Frequency::Monthly
        })
    ));
}

#[test]
fn validate_rejects_monthly_day_zero() {
    let mut s = settings();
    s.frequency = Frequency::Monthly;
    s.schedule_day = Some(0);
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::ScheduleDayOutOfRange { day: 0, .. })
    ));
}

#[test]
fn validate_rejects_monthly_day_twenty_nine() {
    let mut s = settings();
    s.frequency = Frequency::Monthly;
    s.schedule_day = Some(29);
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::ScheduleDayOutOfRange { day: 29, .. })
    ));
}

#[test]
fn validate_rejects_monthly_day_thirty_one() {
    let mut s = settings();
    s.frequency = Frequency::Monthly;
    s.schedule_day = Some(31);
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::ScheduleDayOutOfRange { day: 31, .. })
    ));
}

#[test]
fn validate_accepts_monthly_day_twenty_eight() {
    let mut s = settings();
    s.frequency = Frequency::Monthly;
    s.schedule_day = Some(28);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_ignores_schedule_day_for_daily() {
    let mut s = settings();
    s.frequency = Frequency::Daily;
    s.schedule_day = None;
    assert!(s.validate().is_ok());
    s.schedule_day = Some(3);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_zero_word_count_min() {
    let mut s = settings();
    s.word_count_min = 0;
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::NonPositiveWordCount)
    ));
}

#[test]
fn validate_rejects_inverted_word_count_range() {
    let mut s = settings();
    s.word_count_min = 1200;
    s.word_count_max = 800;
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::InvertedWordCountRange {
            min: 1200,
            max: 800
        })
    ));
}

#[test]
fn validate_rejects_empty_keywords() {
    let mut s = settings();
    s.keywords = vec![];
    assert!(matches!(s.validate(), Err(CampaignConfigError::NoKeywords)));
}

#[test]
fn validate_rejects_keywords_that_normalize_to_nothing() {
    let mut s = settings();
    s.keywords = vec!["  ".to_string(), "".to_string()];
    assert!(matches!(s.validate(), Err(CampaignConfigError::NoKeywords)));
}

#[test]
fn validate_rejects_end_before_start() {
    let mut s = settings();
    s.end_date = Some(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::EndBeforeStart { .. })
    ));
}

#[test]
fn validate_accepts_end_equal_to_start() {
    let mut s = settings();
    s.end_date = Some(s.start_date);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_zero_max_runs() {
    let mut s = settings();
    s.max_runs = Some(0);
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::InvalidMaxRuns)
    ));
}

#[test]
fn validate_rejects_zero_link_budget_with_linking_enabled() {
    let mut s = settings();
    s.max_internal_links = 0;
    assert!(matches!(
        s.validate(),
        Err(CampaignConfigError::InvalidLinkBudget)
    ));
}

#[test]
fn validate_allows_zero_link_budget_with_linking_disabled() {
    let mut s = settings();
    s.internal_linking = false;
    s.max_internal_links = 0;
    assert!(s.validate().is_ok());
}

// ---------------------------------------------------------------------------
// Keyword normalization
// ---------------------------------------------------------------------------

#[test]
fn normalize_keywords_trims_and_drops_empty() {
    let keywords = vec![
        "  raised beds ".to_string(),
        String::new(),
        "composting".to_string(),
    ];
    assert_eq!(normalize_keywords(&keywords), vec!["raised beds", "composting"]);
}

#[test]
fn normalize_keywords_dedupes_case_insensitively() {
    let keywords = vec![
        "Raised Beds".to_string(),
        "raised beds".to_string(),
        "RAISED BEDS".to_string(),
    ];
    // First occurrence wins, original casing kept.
    assert_eq!(normalize_keywords(&keywords), vec!["Raised Beds"]);
}

#[test]
fn normalize_keywords_preserves_order() {
    let keywords = vec![
        "b".to_string(),
        "a".to_string(),
        "c".to_string(),
        "a".to_string(),
    ];
    assert_eq!(normalize_keywords(&keywords), vec!["b", "a", "c"]);
}

// ---------------------------------------------------------------------------
// Enum round trips
// ---------------------------------------------------------------------------

#[test]
fn campaign_status_display_and_parse() {
    for status in [
        CampaignStatus::Draft,
        CampaignStatus::Active,
        CampaignStatus::Paused,
        CampaignStatus::Stopped,
        CampaignStatus::Completed,
    ] {
        let parsed: CampaignStatus = status.to_string().parse().unwrap();
        assert_eq!(parsed, status);
    }
}

#[test]
fn campaign_status_rejects_unknown() {
    assert!("archived".parse::<CampaignStatus>().is_err());
}

#[test]
fn terminal_statuses() {
    assert!(CampaignStatus::Stopped.is_terminal());
    assert!(CampaignStatus::Completed.is_terminal());
    assert!(!CampaignStatus::Draft.is_terminal());
    assert!(!CampaignStatus::Active.is_terminal());
    assert!(!CampaignStatus::Paused.is_terminal());
}

#[test]
fn frequency_display_and_parse() {
    for frequency in [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Monthly,
    ] {
        let parsed: Frequency = frequency.to_string().parse().unwrap();
        assert_eq!(parsed, frequency);
    }
}

#[test]
fn article_status_uses_snake_case() {
    assert_eq!(ArticleStatus::NeedsReview.to_string(), "needs_review");
    assert_eq!(
        "needs_review".parse::<ArticleStatus>().unwrap(),
        ArticleStatus::NeedsReview
    );
    let json = serde_json::to_string(&ArticleStatus::NeedsReview).unwrap();
    assert_eq!(json, "\"needs_review\"");
}

#[test]
fn execution_status_display_and_parse() {
    for status in [
        ExecutionStatus::Success,
        ExecutionStatus::Failed,
        ExecutionStatus::Partial,
    ] {
        let parsed: ExecutionStatus = status.to_string().parse().unwrap();
        assert_eq!(parsed, status);
    }
}

#[test]
fn trigger_source_display_and_parse() {
    assert_eq!(TriggerSource::Scheduled.to_string(), "scheduled");
    assert_eq!(
        "manual".parse::<TriggerSource>().unwrap(),
        TriggerSource::Manual
    );
    assert!("cron".parse::<TriggerSource>().is_err());
}
