//! Property tests for the compensation calculation and attendance aggregation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use instructor_payroll::attendance::{AttendanceRecord, summarize};
use instructor_payroll::calculation::{
    TaxRates, calculate_compensation, round_currency, statutory_components, withhold,
};
use instructor_payroll::config::AttendanceSettings;
use instructor_payroll::models::{
    Adjustments, AttendanceStatus, CompensationProfile, PayModel, SlotRates, TaxRegime, TimeSlot,
    WorkSummary, YearMonth,
};

fn march() -> YearMonth {
    YearMonth::new(2025, 3).unwrap()
}

fn won(max: i64) -> impl Strategy<Value = Decimal> + Clone {
    (0..=max).prop_map(Decimal::from)
}

fn regime() -> impl Strategy<Value = TaxRegime> {
    prop_oneof![
        Just(TaxRegime::None),
        Just(TaxRegime::Flat33Percent),
        Just(TaxRegime::StatutoryInsurance),
    ]
}

fn pay_model() -> impl Strategy<Value = PayModel> {
    let rates = (won(50_000), won(50_000), won(50_000)).prop_map(|(morning, afternoon, evening)| {
        SlotRates {
            morning,
            afternoon,
            evening,
        }
    });
    prop_oneof![
        won(100_000).prop_map(|hourly_rate| PayModel::Hourly { hourly_rate }),
        (rates.clone(), won(100_000))
            .prop_map(|(rates, hourly_rate)| PayModel::PerClass { rates, hourly_rate }),
        won(10_000_000).prop_map(|base_salary| PayModel::Monthly { base_salary }),
        (won(10_000_000), rates).prop_map(|(base_salary, rates)| PayModel::Mixed { base_salary, rates }),
    ]
}

fn summary() -> impl Strategy<Value = WorkSummary> {
    (1u32..40, 0u32..40, 0u32..40, 1u32..=12000).prop_map(|(morning, afternoon, evening, centi_hours)| {
        let mut summary = WorkSummary::empty(march());
        summary.morning_classes = morning;
        summary.afternoon_classes = afternoon;
        summary.evening_classes = evening;
        summary.total_classes = morning + afternoon + evening;
        summary.total_hours = Decimal::new(i64::from(centi_hours), 2);
        summary.attendance_days = summary.total_classes.min(31);
        summary
    })
}

fn attendance_record() -> impl Strategy<Value = AttendanceRecord> {
    let slot = prop_oneof![
        Just(TimeSlot::Morning),
        Just(TimeSlot::Afternoon),
        Just(TimeSlot::Evening),
    ];
    let status = prop_oneof![
        Just(AttendanceStatus::Present),
        Just(AttendanceStatus::Late),
        Just(AttendanceStatus::HalfDay),
        Just(AttendanceStatus::Absent),
        Just(AttendanceStatus::Excused),
    ];
    (1u32..=28, 2u32..=4, slot, status).prop_map(|(day, month, time_slot, status)| AttendanceRecord {
        instructor_id: "inst_001".to_string(),
        work_date: NaiveDate::from_ymd_opt(2025, month, day).unwrap(),
        time_slot,
        status,
        check_in: None,
        check_out: None,
    })
}

proptest! {
    #[test]
    fn gross_and_net_invariants_hold(
        model in pay_model(),
        regime in regime(),
        work in summary(),
        incentive in won(1_000_000),
    ) {
        let profile = CompensationProfile::new("inst_001", model, regime);
        let adjustments = Adjustments::new(incentive, Decimal::ZERO);
        let breakdown =
            calculate_compensation(&profile, &work, &adjustments, &TaxRates::default()).unwrap();

        prop_assert_eq!(breakdown.gross_salary, breakdown.base_amount + breakdown.incentive_amount);
        prop_assert_eq!(
            breakdown.net_salary,
            breakdown.gross_salary - breakdown.tax_amount - breakdown.total_deduction
        );
        prop_assert!(breakdown.is_consistent());
        prop_assert!(breakdown.tax_amount >= Decimal::ZERO);
        prop_assert!(breakdown.tax_amount <= breakdown.gross_salary);
        prop_assert_eq!(breakdown.base_amount, round_currency(breakdown.base_amount));
        prop_assert_eq!(breakdown.net_salary, round_currency(breakdown.net_salary));
    }

    #[test]
    fn calculation_is_deterministic(
        model in pay_model(),
        regime in regime(),
        work in summary(),
        incentive in won(1_000_000),
    ) {
        let profile = CompensationProfile::new("inst_001", model, regime);
        let adjustments = Adjustments::new(incentive, Decimal::ZERO);
        let first = calculate_compensation(&profile, &work, &adjustments, &TaxRates::default());
        let second = calculate_compensation(&profile, &work, &adjustments, &TaxRates::default());
        prop_assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn statutory_components_sum_to_tax(gross in won(50_000_000)) {
        let rates = TaxRates::default();
        let components = statutory_components(gross, &rates.statutory).unwrap();
        let result = withhold(gross, TaxRegime::StatutoryInsurance, &rates, 1).unwrap();

        prop_assert_eq!(components.total(), result.withholding.total());
        prop_assert_eq!(
            components.long_term_care,
            round_currency(components.health_insurance * rates.statutory.long_term_care)
        );
        for part in [
            components.national_pension,
            components.health_insurance,
            components.long_term_care,
            components.employment_insurance,
        ] {
            prop_assert_eq!(part, round_currency(part));
        }
    }

    #[test]
    fn aggregated_slots_match_daily_breakdown(
        records in proptest::collection::vec(attendance_record(), 0..60),
    ) {
        let settings = AttendanceSettings::default();
        let summary = summarize("inst_001", march(), &records, &settings);

        let listed: usize = summary.daily_breakdown.values().map(Vec::len).sum();
        prop_assert_eq!(summary.total_classes as usize, listed);
        prop_assert_eq!(
            summary.total_classes,
            summary.morning_classes + summary.afternoon_classes + summary.evening_classes
        );
        prop_assert_eq!(summary.attendance_days as usize, summary.daily_breakdown.len());
        prop_assert_eq!(
            summary.total_hours,
            settings.default_slot_hours * Decimal::from(summary.total_classes)
        );
        prop_assert!(summary.daily_breakdown.keys().all(|d| march().contains(*d)));
    }
}
