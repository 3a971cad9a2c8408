//! Golden tests for prescription parsing.
//!
//! Each case runs the full text pipeline and checks the first (or only)
//! medicine, its refill estimate and its reminder timetable.

use chrono::NaiveDate;
use rx_scan_core::PrescriptionParser;

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    input: &'static str,
    expected_names: &'static [&'static str],
    expected_dosage: &'static [&'static str],
    expected_food: &'static [&'static str],
    expected_quantity: Option<u32>,
    expected_reminders: usize,
    expected_first_reminder: Option<&'static str>,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "split-dose-five-days",
            input: "Paracetamol 500mg 1-0-1 for 5 days",
            expected_names: &["Paracetamol"],
            expected_dosage: &["500mg", "1-0-1"],
            expected_food: &[],
            expected_quantity: Some(10),
            expected_reminders: 10,
            expected_first_reminder: Some("2024-01-01 08:00"),
        },
        GoldenCase {
            id: "bd-after-food-one-week",
            input: "Amoxicillin 250mg BD after food for 1 week",
            expected_names: &["Amoxicillin"],
            expected_dosage: &["250mg", "BD"],
            expected_food: &["after food"],
            expected_quantity: Some(14),
            expected_reminders: 14,
            expected_first_reminder: Some("2024-01-01 08:30"),
        },
        GoldenCase {
            id: "header-only",
            input: "Dr. John Doe",
            expected_names: &[],
            expected_dosage: &[],
            expected_food: &[],
            expected_quantity: None,
            expected_reminders: 0,
            expected_first_reminder: None,
        },
        GoldenCase {
            id: "details-on-following-lines",
            input: "
                Dr. John Doe
                1. Paracetamol 500mg
                1-0-1 after food
                for 3 days
            ",
            expected_names: &["Paracetamol"],
            expected_dosage: &["500mg", "1-0-1"],
            expected_food: &["after food"],
            expected_quantity: Some(6),
            expected_reminders: 6,
            expected_first_reminder: Some("2024-01-01 08:30"),
        },
        GoldenCase {
            id: "misspelled-name",
            input: "
                2. Amoxcilin 250 mg
                BD
            ",
            expected_names: &["Amoxicillin"],
            expected_dosage: &["250 mg", "BD"],
            expected_food: &[],
            expected_quantity: Some(2),
            expected_reminders: 2,
            expected_first_reminder: Some("2024-01-01 08:00"),
        },
        GoldenCase {
            id: "two-split-lines-before-wins",
            input: "
                3. Metformin 500mg
                1-0-0 before breakfast
                0-0-1 after dinner
            ",
            expected_names: &["Metformin"],
            expected_dosage: &["500mg", "1-0-0", "0-0-1"],
            expected_food: &["before breakfast", "after dinner"],
            expected_quantity: Some(1),
            expected_reminders: 2,
            expected_first_reminder: Some("2024-01-01 07:30"),
        },
        GoldenCase {
            id: "fraction-and-micrograms",
            input: "
                4. Levothyroxine 12.5 mcg
                1/2 tablet
                OD
            ",
            expected_names: &["Levothyroxine"],
            expected_dosage: &["12.5 mcg", "1/2 tablet", "OD"],
            expected_food: &[],
            expected_quantity: Some(1),
            expected_reminders: 1,
            expected_first_reminder: Some("2024-01-01 08:00"),
        },
        GoldenCase {
            id: "noise-lines-dropped",
            input: "
                City Hospital
                Ph: 123456
                Rx
                Atorvastatin 10mg
                HS
            ",
            expected_names: &["Atorvastatin"],
            expected_dosage: &["10mg", "HS"],
            expected_food: &[],
            expected_quantity: Some(1),
            expected_reminders: 1,
            expected_first_reminder: Some("2024-01-01 21:00"),
        },
        GoldenCase {
            id: "several-medicines",
            input: "
                Pan 40 1-0-0 before breakfast for 2 weeks
                Telma 40 0-0-1
                Dolo 650 SOS
            ",
            expected_names: &["Pan 40", "Telma 40", "Dolo 650"],
            expected_dosage: &["1-0-0"],
            expected_food: &["before breakfast"],
            expected_quantity: Some(14),
            expected_reminders: 15,
            expected_first_reminder: Some("2024-01-01 07:30"),
        },
        GoldenCase {
            id: "repeated-medicine-merges",
            input: "
                Cetirizine 10mg night
                Ibuprofen 400mg
                Cetirizine for 3 days
            ",
            expected_names: &["Cetirizine", "Ibuprofen"],
            expected_dosage: &["10mg"],
            expected_food: &[],
            expected_quantity: Some(3),
            expected_reminders: 3,
            expected_first_reminder: Some("2024-01-01 21:00"),
        },
    ]
}

#[test]
fn test_golden_cases() {
    let parser = PrescriptionParser::new();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    for case in get_golden_cases() {
        let result = parser.parse_text(case.input, start, &[]);

        let names: Vec<&str> = result.medicines.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, case.expected_names, "Case {}: names mismatch", case.id);
        assert_eq!(
            result.refill_info.len(),
            result.medicines.len(),
            "Case {}: one refill estimate per medicine",
            case.id
        );
        assert_eq!(
            result.reminders.len(),
            case.expected_reminders,
            "Case {}: reminder count mismatch",
            case.id
        );

        let Some(first) = result.medicines.first() else {
            continue;
        };

        assert_eq!(first.dosage, case.expected_dosage, "Case {}: dosage mismatch", case.id);
        assert_eq!(
            first.food_instruction, case.expected_food,
            "Case {}: food instruction mismatch",
            case.id
        );

        if let Some(expected) = case.expected_quantity {
            let refill = result.refill_for(&first.name).unwrap();
            assert_eq!(
                refill.total_quantity_needed, expected,
                "Case {}: quantity mismatch",
                case.id
            );
        }

        assert_eq!(
            result.reminders.first().map(|r| r.datetime.as_str()),
            case.expected_first_reminder,
            "Case {}: first reminder mismatch",
            case.id
        );
    }
}

#[test]
fn test_extra_names_take_priority() {
    let parser = PrescriptionParser::new();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let result = parser.parse_text(
        "Paracip 500mg TID for 2 days",
        start,
        &["Paracip".to_string()],
    );
    assert_eq!(result.medicines.len(), 1);
    assert_eq!(result.medicines[0].name, "Paracip");

    let refill = result.refill_for("Paracip").unwrap();
    assert_eq!(refill.daily_frequency, 3);
    assert_eq!(refill.total_quantity_needed, 6);
    assert_eq!(refill.refill_due_date, "2024-01-03");

    let times: Vec<&str> = result
        .reminders_for("Paracip")
        .take(3)
        .map(|r| r.datetime.as_str())
        .collect();
    assert_eq!(
        times,
        vec!["2024-01-01 08:00", "2024-01-01 13:00", "2024-01-01 21:00"]
    );
}

#[test]
fn test_timing_and_food_are_lowercased() {
    let parser = PrescriptionParser::new();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let result = parser.parse_text("Omeprazole 20mg MORNING Before Food", start, &[]);
    let med = &result.medicines[0];
    assert_eq!(med.timing, vec!["morning".to_string()]);
    assert_eq!(med.food_instruction, vec!["before food".to_string()]);
    assert_eq!(result.reminders[0].datetime, "2024-01-01 07:30");
}

#[test]
fn test_ranges_and_dates_do_not_inflate_frequency() {
    let parser = PrescriptionParser::new();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let range = parser.parse_text("Paracetamol 500mg for 3-5 days", start, &[]);
    assert_eq!(range.medicines[0].dosage, vec!["500mg".to_string()]);
    let refill = range.refill_for("Paracetamol").unwrap();
    assert_eq!((refill.daily_frequency, refill.duration_days), (1, 5));
    assert_eq!(refill.total_quantity_needed, 5);

    let strength_range = parser.parse_text("Metformin 500-1000 mg OD", start, &[]);
    assert_eq!(strength_range.refill_for("Metformin").unwrap().daily_frequency, 1);

    let dated = parser.parse_text("Aspirin 75mg OD\nDate 12-03-2024", start, &[]);
    assert_eq!(
        dated.medicines[0].dosage,
        vec!["75mg".to_string(), "OD".to_string()]
    );
    assert_eq!(dated.refill_for("Aspirin").unwrap().daily_frequency, 1);
    assert_eq!(dated.reminders.len(), 1);
}

#[test]
fn test_noise_line_inside_medicine_contributes_nothing() {
    let parser = PrescriptionParser::new();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let result = parser.parse_text(
        "Paracetamol 500mg\nDr. Rao 2 tablets for 9 days\nfor 3 days",
        start,
        &[],
    );
    assert_eq!(result.medicines.len(), 1);
    let med = &result.medicines[0];
    assert_eq!(med.dosage, vec!["500mg".to_string()]);
    assert!(!med.dosage.contains(&"2 tablets".to_string()));
    assert_eq!(
        med.duration,
        vec!["3 days".to_string(), "for 3 days".to_string()]
    );
    assert_eq!(result.refill_for("Paracetamol").unwrap().duration_days, 3);
}
