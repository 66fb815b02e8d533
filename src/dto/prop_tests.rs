use super::*;
use crate::test_utils::{arb_card_draft, arb_money};
use proptest::prelude::*;

proptest! {
    /// D1.1: an empty payload applied to a draft leaves it unchanged
    #[test]
    fn prop_d1_1_empty_patch_is_identity(draft in arb_card_draft()) {
        prop_assert_eq!(CardDto::default().apply_to(draft.clone()), draft);
    }

    /// D1.2: a payload only touching the value changes nothing else
    #[test]
    fn prop_d1_2_value_patch_is_local(draft in arb_card_draft(), value in arb_money()) {
        let patched = CardDto { estimated_value: Some(value), ..Default::default() }
            .apply_to(draft.clone());

        prop_assert_eq!(patched.estimated_value, value);
        prop_assert_eq!(CardDraft { estimated_value: draft.estimated_value, ..patched }, draft);
    }

    /// D2.1: any threshold in 0..=1 is accepted and kept as given
    #[test]
    fn prop_d2_1_threshold_in_range_kept(threshold in 0u32..=100u32) {
        let threshold = threshold as f64 / 100.0;
        let request = StartScanDto {
            job_name: Some("job".to_string()),
            folder_path: Some("/tmp".to_string()),
            settings: Some(ScanSettingsDto {
                confidence_threshold: Some(threshold),
                ..Default::default()
            }),
        }
        .resolve(&ScanningSettings::default())
        .unwrap();

        prop_assert_eq!(request.settings.confidence_threshold, threshold);
    }

    /// D2.2: thresholds above 1 are rejected
    #[test]
    fn prop_d2_2_threshold_above_one_rejected(threshold in 1.0001f64..100.0f64) {
        let result = StartScanDto {
            job_name: Some("job".to_string()),
            folder_path: Some("/tmp".to_string()),
            settings: Some(ScanSettingsDto {
                confidence_threshold: Some(threshold),
                ..Default::default()
            }),
        }
        .resolve(&ScanningSettings::default());

        prop_assert!(result.is_err());
    }

    /// D3.1: total_pages * limit always covers total, with less than one page to spare
    #[test]
    fn prop_d3_1_total_pages_cover_total(total in 0i64..10_000, limit in 1u32..200) {
        let page = CardPage::new(vec![], total, 1, Some(limit));
        let capacity = page.total_pages as i64 * limit as i64;
        prop_assert!(capacity >= total);
        prop_assert!(capacity - total < limit as i64);
    }
}
