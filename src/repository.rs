//! Repositories owning the persisted collections.
//!
//! Each repository owns exactly one storage slot and is the only writer for
//! it. Edits replace records in place (preserving list position) and deletes
//! of absent ids are silent no-ops.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use chrono::{DateTime, Duration, Local};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{PharmacyError, Result};
use crate::models::{
    DailyRecord, FoodEntry, IdGenerator, NewPharmacy, NewWellnessProgram, Pharmacy, Prescription,
    Profile, UploadRecord, UploadStatus, WellnessProgram,
};
use crate::store::{keys, Store};
use crate::utils::date_key;
use crate::validation::InputValidator;

/// A record persisted inside a named collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Storage key of the owning collection
    const KEY: &'static str;

    /// Stable identity used for update and delete
    fn id(&self) -> &str;
}

impl Record for Pharmacy {
    const KEY: &'static str = keys::PHARMACIES;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for WellnessProgram {
    const KEY: &'static str = keys::WELLNESS_PROGRAMS;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for UploadRecord {
    const KEY: &'static str = keys::UPLOAD_HISTORY;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for crate::models::Conversation {
    const KEY: &'static str = keys::CONVERSATIONS;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Prescription {
    const KEY: &'static str = keys::PRESCRIPTIONS;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Generic list/insert/update/delete over one collection slot.
#[derive(Debug, Clone)]
pub struct Collection<T: Record> {
    store: Store,
    _marker: PhantomData<T>,
}

impl<T: Record> Collection<T> {
    /// Bind a collection to its store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// All records in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<T> {
        self.store.get_or(T::KEY, Vec::new())
    }

    /// Append a record and persist.
    pub fn insert(&self, record: T) -> Result<()> {
        let mut all = self.list();
        all.push(record);
        self.save(&all)
    }

    /// Prepend a record and persist.
    pub fn insert_front(&self, record: T) -> Result<()> {
        let mut all = self.list();
        all.insert(0, record);
        self.save(&all)
    }

    /// Replace the record with the same id in place, preserving position.
    ///
    /// Returns `false` when no record carries the id.
    pub fn update(&self, id: &str, record: T) -> Result<bool> {
        let mut all = self.list();
        let Some(slot) = all.iter_mut().find(|existing| existing.id() == id) else {
            return Ok(false);
        };
        *slot = record;
        self.save(&all)?;
        Ok(true)
    }

    /// Remove the record with the given id.
    ///
    /// Deleting an absent id leaves the collection unchanged and returns
    /// `false` rather than erroring.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut all = self.list();
        let before = all.len();
        all.retain(|record| record.id() != id);
        if all.len() == before {
            return Ok(false);
        }
        self.save(&all)?;
        Ok(true)
    }

    /// Persist the full collection.
    pub fn save(&self, all: &[T]) -> Result<()> {
        self.store.put(T::KEY, &all)
    }
}

/// Repository for the registered pharmacies.
#[derive(Debug, Clone)]
pub struct PharmacyRepo {
    collection: Collection<Pharmacy>,
}

impl PharmacyRepo {
    /// Bind to the store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            collection: Collection::new(store),
        }
    }

    /// All pharmacies in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<Pharmacy> {
        self.collection.list()
    }

    /// Create a pharmacy with a fresh id and creation timestamp.
    pub fn create(&self, fields: NewPharmacy) -> Result<Pharmacy> {
        let pharmacy = Pharmacy {
            id: IdGenerator::next("ph"),
            name: fields.name,
            address: fields.address,
            phone: fields.phone,
            email: fields.email,
            license: fields.license,
            created_at: Local::now(),
        };
        self.collection.insert(pharmacy.clone())?;
        debug!(id = %pharmacy.id, "pharmacy created");
        Ok(pharmacy)
    }

    /// Replace an existing pharmacy's fields in place, keeping its id,
    /// creation timestamp and list position.
    pub fn update(&self, id: &str, fields: NewPharmacy) -> Result<bool> {
        let Some(existing) = self.collection.list().into_iter().find(|p| p.id == id) else {
            return Ok(false);
        };
        let updated = Pharmacy {
            id: existing.id.clone(),
            name: fields.name,
            address: fields.address,
            phone: fields.phone,
            email: fields.email,
            license: fields.license,
            created_at: existing.created_at,
        };
        self.collection.update(id, updated)
    }

    /// Delete by id; absent ids are a silent no-op.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.collection.remove(id)
    }
}

/// Repository for the wellness programs.
#[derive(Debug, Clone)]
pub struct WellnessRepo {
    collection: Collection<WellnessProgram>,
}

impl WellnessRepo {
    /// Bind to the store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            collection: Collection::new(store),
        }
    }

    /// All programs in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<WellnessProgram> {
        self.collection.list()
    }

    /// Create a program with a fresh id after validating dates and price.
    pub fn create(&self, fields: NewWellnessProgram) -> Result<WellnessProgram> {
        InputValidator::validate_program_dates(fields.start_date, fields.end_date)
            .map_err(|err| PharmacyError::Validation(err.to_string()))?;
        InputValidator::validate_price(fields.price)
            .map_err(|err| PharmacyError::Validation(err.to_string()))?;

        let program = WellnessProgram {
            id: IdGenerator::next("wp"),
            name: fields.name,
            description: fields.description,
            start_date: fields.start_date,
            end_date: fields.end_date,
            price: fields.price,
            created_at: Local::now(),
        };
        self.collection.insert(program.clone())?;
        debug!(id = %program.id, "wellness program created");
        Ok(program)
    }

    /// Replace an existing program's fields in place after validation.
    pub fn update(&self, id: &str, fields: NewWellnessProgram) -> Result<bool> {
        InputValidator::validate_program_dates(fields.start_date, fields.end_date)
            .map_err(|err| PharmacyError::Validation(err.to_string()))?;
        InputValidator::validate_price(fields.price)
            .map_err(|err| PharmacyError::Validation(err.to_string()))?;

        let Some(existing) = self.collection.list().into_iter().find(|p| p.id == id) else {
            return Ok(false);
        };
        let updated = WellnessProgram {
            id: existing.id.clone(),
            name: fields.name,
            description: fields.description,
            start_date: fields.start_date,
            end_date: fields.end_date,
            price: fields.price,
            created_at: existing.created_at,
        };
        self.collection.update(id, updated)
    }

    /// Delete by id; absent ids are a silent no-op.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.collection.remove(id)
    }

    /// Programs whose end date is today or later.
    #[must_use]
    pub fn active(&self, now: &DateTime<Local>) -> Vec<WellnessProgram> {
        let today = now.date_naive();
        self.list()
            .into_iter()
            .filter(|program| program.end_date >= today)
            .collect()
    }

    /// Programs ending within `days` from now, soonest first.
    #[must_use]
    pub fn expiring_within(&self, days: i64, now: &DateTime<Local>) -> Vec<WellnessProgram> {
        let today = now.date_naive();
        let cutoff = today + Duration::days(days);
        let mut upcoming: Vec<WellnessProgram> = self
            .list()
            .into_iter()
            .filter(|program| program.end_date >= today && program.end_date <= cutoff)
            .collect();
        upcoming.sort_by_key(|program| program.end_date);
        upcoming
    }
}

/// Append-only audit log of completed imports.
#[derive(Debug, Clone)]
pub struct UploadLog {
    collection: Collection<UploadRecord>,
}

impl UploadLog {
    /// Bind to the store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            collection: Collection::new(store),
        }
    }

    /// Append one audit entry for a completed import.
    pub fn record(&self, file_name: &str, upload_type: &str, records_count: usize) -> Result<UploadRecord> {
        let entry = UploadRecord {
            id: IdGenerator::next("up"),
            date: Local::now(),
            file_name: file_name.to_string(),
            upload_type: upload_type.to_string(),
            records_count,
            status: UploadStatus::Success,
        };
        self.collection.insert(entry.clone())?;
        Ok(entry)
    }

    /// All entries, most recent first (display order).
    #[must_use]
    pub fn history(&self) -> Vec<UploadRecord> {
        let mut all = self.collection.list();
        all.reverse();
        all
    }

    /// The `n` most recent entries, most recent first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<UploadRecord> {
        self.history().into_iter().take(n).collect()
    }

    /// All entries in insertion order, for analytics.
    #[must_use]
    pub fn list(&self) -> Vec<UploadRecord> {
        self.collection.list()
    }
}

/// Singleton profile repository.
#[derive(Debug, Clone)]
pub struct ProfileRepo {
    store: Store,
}

impl ProfileRepo {
    /// Bind to the store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Load the profile, defaulting to an empty one.
    #[must_use]
    pub fn load(&self) -> Profile {
        self.store.get_or(keys::USER_PROFILE, Profile::default())
    }

    /// Validate and upsert the profile, keeping the stored last-login stamp.
    pub fn save(&self, mut profile: Profile) -> Result<Profile> {
        InputValidator::validate_full_name(&profile.full_name)
            .map_err(|err| PharmacyError::Validation(err.to_string()))?;
        InputValidator::validate_email(&profile.email)
            .map_err(|err| PharmacyError::Validation(err.to_string()))?;
        InputValidator::validate_phone(&profile.phone)
            .map_err(|err| PharmacyError::Validation(err.to_string()))?;

        profile.last_login = self.load().last_login;
        self.store.put(keys::USER_PROFILE, &profile)?;
        Ok(profile)
    }

    /// Stamp the last-login time, creating the profile slot if needed.
    pub fn touch_last_login(&self, now: DateTime<Local>) -> Result<Profile> {
        let mut profile = self.load();
        profile.last_login = Some(now);
        self.store.put(keys::USER_PROFILE, &profile)?;
        Ok(profile)
    }
}

/// Sample prescriptions seeded on first open.
fn seed_prescriptions(now: DateTime<Local>) -> Vec<Prescription> {
    let sample = [
        ("Atorvastatin", "20 mg", 8),
        ("Metformin", "500 mg", 2),
        ("Lisinopril", "10 mg", -1),
    ];
    sample
        .iter()
        .map(|(name, dosage, days)| Prescription {
            id: IdGenerator::next("rx"),
            name: (*name).to_string(),
            dosage: (*dosage).to_string(),
            refill_date: now + Duration::days(*days),
            file_name: None,
        })
        .collect()
}

/// Repository for tracked prescriptions.
#[derive(Debug, Clone)]
pub struct PrescriptionRepo {
    store: Store,
    collection: Collection<Prescription>,
}

impl PrescriptionRepo {
    /// Bind to the store, seeding sample prescriptions when the slot has
    /// never been written (an explicitly emptied list is left empty).
    pub fn open(store: Store, now: DateTime<Local>) -> Result<Self> {
        let repo = Self {
            store: store.clone(),
            collection: Collection::new(store),
        };
        if repo.store.get::<Vec<Prescription>>(keys::PRESCRIPTIONS).is_none() {
            repo.collection.save(&seed_prescriptions(now))?;
        }
        Ok(repo)
    }

    /// All prescriptions, most recently added first.
    #[must_use]
    pub fn list(&self) -> Vec<Prescription> {
        self.collection.list()
    }

    /// Add a prescription to the front of the list.
    pub fn add(
        &self,
        name: &str,
        dosage: &str,
        refill_date: DateTime<Local>,
        file_name: Option<String>,
    ) -> Result<Prescription> {
        let prescription = Prescription {
            id: IdGenerator::next("rx"),
            name: name.to_string(),
            dosage: dosage.to_string(),
            refill_date,
            file_name,
        };
        self.collection.insert_front(prescription.clone())?;
        Ok(prescription)
    }

    /// Request a refill: the next refill date becomes 30 days from now.
    /// Absent ids are a silent no-op.
    pub fn request_refill(&self, id: &str, now: DateTime<Local>) -> Result<Option<Prescription>> {
        self.reschedule(id, |_| now + Duration::days(30))
    }

    /// Push the refill date back by one day. Absent ids are a silent no-op.
    pub fn snooze(&self, id: &str) -> Result<Option<Prescription>> {
        self.reschedule(id, |current| current + Duration::days(1))
    }

    fn reschedule<F>(&self, id: &str, next_date: F) -> Result<Option<Prescription>>
    where
        F: FnOnce(DateTime<Local>) -> DateTime<Local>,
    {
        let mut all = self.collection.list();
        let Some(slot) = all.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        slot.refill_date = next_date(slot.refill_date);
        let updated = slot.clone();
        self.collection.save(&all)?;
        Ok(Some(updated))
    }

    /// Prescriptions whose refill day has arrived or passed.
    #[must_use]
    pub fn due(&self, now: &DateTime<Local>) -> Vec<Prescription> {
        self.list()
            .into_iter()
            .filter(|p| crate::utils::days_until(&p.refill_date, now) <= 0)
            .collect()
    }

    /// Prescriptions due within the next three days.
    #[must_use]
    pub fn due_soon(&self, now: &DateTime<Local>) -> Vec<Prescription> {
        self.list()
            .into_iter()
            .filter(|p| {
                let days = crate::utils::days_until(&p.refill_date, now);
                (1..=3).contains(&days)
            })
            .collect()
    }
}

/// Wellness diary: one record per calendar day, lazily created.
#[derive(Debug, Clone)]
pub struct WellnessDiary {
    store: Store,
}

impl WellnessDiary {
    /// Bind to the store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    fn records(&self) -> BTreeMap<String, DailyRecord> {
        self.store.get_or(keys::WELLNESS_DIARY, BTreeMap::new())
    }

    /// Today's record, created on first access.
    pub fn today(&self, now: &DateTime<Local>) -> Result<DailyRecord> {
        let key = date_key(now);
        let mut records = self.records();
        if !records.contains_key(&key) {
            records.insert(key.clone(), DailyRecord::default());
            self.store.put(keys::WELLNESS_DIARY, &records)?;
        }
        Ok(records.get(&key).cloned().unwrap_or_default())
    }

    fn update_today<F>(&self, now: &DateTime<Local>, mutate: F) -> Result<DailyRecord>
    where
        F: FnOnce(&mut DailyRecord),
    {
        let key = date_key(now);
        let mut records = self.records();
        let record = records.entry(key).or_default();
        mutate(record);
        let updated = record.clone();
        self.store.put(keys::WELLNESS_DIARY, &records)?;
        Ok(updated)
    }

    /// Record today's mood.
    pub fn set_mood(&self, now: &DateTime<Local>, mood: &str) -> Result<DailyRecord> {
        self.update_today(now, |record| record.mood = mood.to_string())
    }

    /// Add or remove glasses of water, clamped to `0..=24`.
    pub fn adjust_water(&self, now: &DateTime<Local>, delta: i32) -> Result<DailyRecord> {
        self.update_today(now, |record| {
            let water = i64::from(record.water) + i64::from(delta);
            record.water = u32::try_from(water.clamp(0, 24)).unwrap_or(0);
        })
    }

    /// Append a food entry to today's log. Blank input is a silent no-op.
    pub fn add_food(&self, now: &DateTime<Local>, text: &str) -> Result<DailyRecord> {
        let text = InputValidator::sanitize_text(text);
        self.update_today(now, |record| {
            if !text.is_empty() {
                record.foods.push(FoodEntry {
                    id: IdGenerator::next("food"),
                    text,
                });
            }
        })
    }

    /// Remove a food entry by id; absent ids are a silent no-op.
    pub fn remove_food(&self, now: &DateTime<Local>, id: &str) -> Result<DailyRecord> {
        self.update_today(now, |record| {
            record.foods.retain(|food| food.id != id);
        })
    }
}
