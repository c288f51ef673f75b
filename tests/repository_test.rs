//! Integration tests for the collection repositories.

use chrono::{Duration, Local, NaiveDate};
use pharmacare::models::{NewPharmacy, NewWellnessProgram, Profile};
use pharmacare::repository::{
    PharmacyRepo, PrescriptionRepo, ProfileRepo, UploadLog, WellnessDiary, WellnessRepo,
};
use pharmacare::store::Store;
use pharmacare::utils::days_until;
use tempfile::tempdir;

fn open_store(dir: &tempfile::TempDir) -> Store {
    Store::open(dir.path()).expect("open store")
}

fn pharmacy_fields(name: &str) -> NewPharmacy {
    NewPharmacy {
        name: name.to_string(),
        address: "220 Seaport Blvd, Boston, MA".to_string(),
        phone: "(617) 555-0145".to_string(),
        email: "hello@harborrx.test".to_string(),
        license: "LIC-200".to_string(),
    }
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}

#[test]
fn identical_creates_never_share_an_id() {
    let dir = tempdir().expect("temp dir");
    let repo = PharmacyRepo::new(open_store(&dir));

    let first = repo.create(pharmacy_fields("Harbor Wellness Rx")).expect("create");
    let second = repo.create(pharmacy_fields("Harbor Wellness Rx")).expect("create");

    assert_ne!(first.id, second.id);
    assert_eq!(repo.list().len(), 2);
}

#[test]
fn list_is_idempotent_without_mutation() {
    let dir = tempdir().expect("temp dir");
    let repo = PharmacyRepo::new(open_store(&dir));
    repo.create(pharmacy_fields("Back Bay Apothecary")).expect("create");

    assert_eq!(repo.list(), repo.list());
}

#[test]
fn update_replaces_in_place_and_preserves_position() {
    let dir = tempdir().expect("temp dir");
    let repo = PharmacyRepo::new(open_store(&dir));

    repo.create(pharmacy_fields("First")).expect("create");
    let middle = repo.create(pharmacy_fields("Middle")).expect("create");
    repo.create(pharmacy_fields("Last")).expect("create");

    let mut fields = pharmacy_fields("Middle Renamed");
    fields.license = "LIC-999".to_string();
    assert!(repo.update(&middle.id, fields).expect("update"));

    let names: Vec<String> = repo.list().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["First", "Middle Renamed", "Last"]);

    let updated = repo
        .list()
        .into_iter()
        .find(|p| p.id == middle.id)
        .expect("still present under the same id");
    assert_eq!(updated.license, "LIC-999");
    assert_eq!(updated.created_at, middle.created_at);
}

#[test]
fn updating_an_absent_id_reports_false() {
    let dir = tempdir().expect("temp dir");
    let repo = PharmacyRepo::new(open_store(&dir));

    assert!(!repo.update("ph_missing", pharmacy_fields("Ghost")).expect("update"));
}

#[test]
fn deleting_an_absent_id_leaves_the_collection_unchanged() {
    let dir = tempdir().expect("temp dir");
    let repo = PharmacyRepo::new(open_store(&dir));
    repo.create(pharmacy_fields("Charles River Pharmacy")).expect("create");

    let before = repo.list();
    assert!(!repo.delete("ph_missing").expect("delete"));
    assert_eq!(repo.list(), before);
}

#[test]
fn wellness_program_round_trip_keeps_price() {
    let dir = tempdir().expect("temp dir");
    let repo = WellnessRepo::new(open_store(&dir));

    repo.create(NewWellnessProgram {
        name: "Yoga".to_string(),
        description: "Morning yoga sessions".to_string(),
        start_date: date("2024-01-01"),
        end_date: date("2024-01-31"),
        price: 49.99,
    })
    .expect("create");

    let programs = repo.list();
    assert_eq!(programs.len(), 1);
    assert_eq!(format!("{:.2}", programs[0].price), "49.99");
    assert_eq!(programs[0].name, "Yoga");
}

#[test]
fn wellness_program_rejects_inverted_dates() {
    let dir = tempdir().expect("temp dir");
    let repo = WellnessRepo::new(open_store(&dir));

    let result = repo.create(NewWellnessProgram {
        name: "Backwards".to_string(),
        description: String::new(),
        start_date: date("2024-02-01"),
        end_date: date("2024-01-01"),
        price: 10.0,
    });
    assert!(result.is_err());
    assert!(repo.list().is_empty());
}

#[test]
fn wellness_program_rejects_negative_price() {
    let dir = tempdir().expect("temp dir");
    let repo = WellnessRepo::new(open_store(&dir));

    let result = repo.create(NewWellnessProgram {
        name: "Freebie".to_string(),
        description: String::new(),
        start_date: date("2024-01-01"),
        end_date: date("2024-01-31"),
        price: -1.0,
    });
    assert!(result.is_err());
}

#[test]
fn expiring_programs_are_sorted_by_end_date() {
    let dir = tempdir().expect("temp dir");
    let repo = WellnessRepo::new(open_store(&dir));
    let now = Local::now();
    let today = now.date_naive();

    for (name, days) in [("Later", 20), ("Soonest", 3), ("Middle", 10)] {
        repo.create(NewWellnessProgram {
            name: name.to_string(),
            description: String::new(),
            start_date: today,
            end_date: today + Duration::days(days),
            price: 5.0,
        })
        .expect("create");
    }

    let names: Vec<String> = repo
        .expiring_within(30, &now)
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Soonest", "Middle", "Later"]);
}

#[test]
fn upload_history_is_most_recent_first() {
    let dir = tempdir().expect("temp dir");
    let log = UploadLog::new(open_store(&dir));

    log.record("first.csv", "pharmacies", 2).expect("record");
    log.record("second.csv", "wellness", 3).expect("record");

    let history = log.history();
    assert_eq!(history[0].file_name, "second.csv");
    assert_eq!(history[1].file_name, "first.csv");
    assert_eq!(log.recent(1).len(), 1);
    assert_eq!(log.recent(1)[0].file_name, "second.csv");
}

#[test]
fn profile_save_validates_and_preserves_last_login() {
    let dir = tempdir().expect("temp dir");
    let repo = ProfileRepo::new(open_store(&dir));
    let now = Local::now();

    repo.touch_last_login(now).expect("touch");

    let saved = repo
        .save(Profile {
            full_name: "Avery Quinn".to_string(),
            email: "avery@example.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            address: "Boston, MA".to_string(),
            last_login: None,
        })
        .expect("save");
    assert_eq!(saved.last_login, Some(now));

    let invalid = repo.save(Profile {
        full_name: "Avery Quinn".to_string(),
        email: "not-an-email".to_string(),
        phone: "+1 (555) 123-4567".to_string(),
        address: String::new(),
        last_login: None,
    });
    assert!(invalid.is_err());

    // The failed save must not clobber the stored profile.
    assert_eq!(repo.load().email, "avery@example.com");
}

#[test]
fn prescriptions_seed_only_on_first_open() {
    let dir = tempdir().expect("temp dir");
    let store = open_store(&dir);
    let now = Local::now();

    let repo = PrescriptionRepo::open(store.clone(), now).expect("open");
    let seeded = repo.list();
    assert_eq!(seeded.len(), 3);

    for prescription in &seeded {
        repo.request_refill(&prescription.id, now).expect("refill");
    }
    let repo = PrescriptionRepo::open(store, now).expect("reopen");
    assert_eq!(repo.list().len(), 3);
}

#[test]
fn refill_and_snooze_reschedule_the_date() {
    let dir = tempdir().expect("temp dir");
    let now = Local::now();
    let repo = PrescriptionRepo::open(open_store(&dir), now).expect("open");

    let added = repo
        .add("Amoxicillin", "250 mg", now + Duration::days(2), None)
        .expect("add");
    // New prescriptions go to the front of the list.
    assert_eq!(repo.list()[0].id, added.id);

    let refilled = repo
        .request_refill(&added.id, now)
        .expect("refill")
        .expect("present");
    assert_eq!(days_until(&refilled.refill_date, &now), 30);

    let snoozed = repo.snooze(&added.id).expect("snooze").expect("present");
    assert_eq!(days_until(&snoozed.refill_date, &now), 31);

    assert!(repo.request_refill("rx_missing", now).expect("refill").is_none());
}

#[test]
fn due_and_due_soon_bucket_by_days() {
    let dir = tempdir().expect("temp dir");
    let now = Local::now();
    let repo = PrescriptionRepo::open(open_store(&dir), now).expect("open");

    // The seed data has refills in 8 days, in 2 days and yesterday.
    let due: Vec<String> = repo.due(&now).into_iter().map(|p| p.name).collect();
    assert_eq!(due, vec!["Lisinopril"]);

    let soon: Vec<String> = repo.due_soon(&now).into_iter().map(|p| p.name).collect();
    assert_eq!(soon, vec!["Metformin"]);
}

#[test]
fn diary_creates_today_lazily_and_clamps_water() {
    let dir = tempdir().expect("temp dir");
    let diary = WellnessDiary::new(open_store(&dir));
    let now = Local::now();

    let fresh = diary.today(&now).expect("today");
    assert_eq!(fresh.water, 0);
    assert_eq!(fresh.water_max, 8);
    assert!(fresh.foods.is_empty());

    let record = diary.adjust_water(&now, -5).expect("water");
    assert_eq!(record.water, 0);

    let record = diary.adjust_water(&now, 30).expect("water");
    assert_eq!(record.water, 24);
}

#[test]
fn diary_food_log_appends_and_removes() {
    let dir = tempdir().expect("temp dir");
    let diary = WellnessDiary::new(open_store(&dir));
    let now = Local::now();

    diary.add_food(&now, "Oatmeal").expect("add");
    let record = diary.add_food(&now, "Apple").expect("add");
    assert_eq!(record.foods.len(), 2);

    let first = record.foods[0].id.clone();
    let record = diary.remove_food(&now, &first).expect("remove");
    assert_eq!(record.foods.len(), 1);
    assert_eq!(record.foods[0].text, "Apple");

    // Removing an unknown entry is a silent no-op.
    let record = diary.remove_food(&now, "food_missing").expect("remove");
    assert_eq!(record.foods.len(), 1);
}
