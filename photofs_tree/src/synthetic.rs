//! Collections computed from the catalog rather than stored in it.
//!
//! Each view is produced by a [`Generator`],
//! which sees only the photos and rolls of the library.
//! Any closure `Fn(&Photos, &Rolls) -> Collection` is a generator.
//! Generators run once, when the tree is built,
//! so time-dependent views are fixed for the lifetime of the tree.

use crate::Collection;
use chrono::DateTime;
use chrono::Months;
use chrono::Utc;
use photofs_catalog::Photo;
use photofs_catalog::Photos;
use photofs_catalog::Rolls;

pub const PHOTOS: &str = "Photos";
pub const FLAGGED: &str = "Flagged";
pub const LAST_IMPORT: &str = "Last Import";

/// Length of the window of the standard "Last N Months" view.
pub const LAST_MONTHS: u32 = 12;

/// Computes one synthetic collection.
pub trait Generator
{
    fn generate(&self, photos: &Photos, rolls: &Rolls) -> Collection;
}

impl<F> Generator for F
    where F: Fn(&Photos, &Rolls) -> Collection
{
    fn generate(&self, photos: &Photos, rolls: &Rolls) -> Collection
    {
        self(photos, rolls)
    }
}

/// The synthetic views every library gets, in the order they are listed:
/// Photos, Flagged, Last 12 Months, and Last Import.
pub fn standard_generators(now: DateTime<Utc>)
    -> Vec<Box<dyn Generator + Send + Sync>>
{
    vec![
        Box::new(all_photos),
        Box::new(flagged),
        Box::new(last_months(now, LAST_MONTHS)),
        Box::new(last_import),
    ]
}

/// Every photo in the library.
pub fn all_photos(photos: &Photos, _rolls: &Rolls) -> Collection
{
    filtered("synthetic:photos", PHOTOS, photos, |_| true)
}

/// Every flagged photo.
pub fn flagged(photos: &Photos, _rolls: &Rolls) -> Collection
{
    filtered("synthetic:flagged", FLAGGED, photos, |p| p.flagged)
}

/// Every photo taken between the same instant
/// `months` calendar months before `now`, and `now` itself.
/// Both ends are inclusive; photos dated after `now` are left out.
///
/// Calendar months vary in length, so the window is not a fixed duration.
/// If the month arithmetic would clamp to a shorter month,
/// chrono moves the boundary to the last day of that month.
pub fn last_months(now: DateTime<Utc>, months: u32)
    -> impl Fn(&Photos, &Rolls) -> Collection
{
    let since = now.checked_sub_months(Months::new(months))
                   .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let name = format!("Last {} Months", months);
    move |photos, _rolls| {
        filtered("synthetic:last-months", &*name, photos,
                 |p| since <= p.timestamp && p.timestamp <= now)
    }
}

/// The photos of the most recent roll.
///
/// When several rolls share the latest date,
/// the one with the greatest identifier wins.
pub fn last_import(_photos: &Photos, rolls: &Rolls) -> Collection
{
    let latest = rolls.values().max_by(|a, b| {
        a.timestamp.cmp(&b.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
    let photos = latest.map(|r| r.photos.clone()).unwrap_or_default();
    Collection::new("synthetic:last-import", LAST_IMPORT, photos)
}

fn filtered(id: &str, name: &str, photos: &Photos,
            keep: impl Fn(&Photo) -> bool) -> Collection
{
    let photos = photos.values()
                       .filter(|p| keep(p))
                       .map(|p| p.id.clone())
                       .collect();
    Collection::new(id, name, photos)
}
