//! Weapon shop
//!
//! Purchases and equipping operate on a `PlayerRecord`; callers persist
//! the record afterwards. A rejected request leaves the record untouched.

use serde::Serialize;

use crate::catalog::{WeaponCatalog, WeaponSpec};
use crate::persistence::PlayerRecord;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    #[error("No weapon named '{0}'")]
    NotFound(String),

    #[error("Need {price} points, have {available}")]
    InsufficientFunds { price: u64, available: u64 },

    #[error("'{0}' is already owned")]
    AlreadyOwned(String),

    #[error("'{0}' is not owned")]
    NotOwned(String),
}

/// A successful purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub weapon: String,
    pub price: u64,
    pub points_left: u64,
}

/// One shop line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopEntry {
    pub weapon: WeaponSpec,
    pub owned: bool,
    pub equipped: bool,
    pub affordable: bool,
}

/// Catalog entries annotated for `record`
pub fn listing(catalog: &dyn WeaponCatalog, record: &PlayerRecord) -> Vec<ShopEntry> {
    catalog
        .list_all()
        .into_iter()
        .map(|weapon| ShopEntry {
            owned: record.owns(&weapon.name),
            equipped: record.current_weapon == weapon.name,
            affordable: record.points >= weapon.price,
            weapon,
        })
        .collect()
}

/// Buy and equip a weapon, debiting exactly its price
pub fn purchase(
    catalog: &dyn WeaponCatalog,
    record: &mut PlayerRecord,
    weapon_id: &str,
) -> Result<Receipt, ShopError> {
    let weapon = catalog
        .get(weapon_id)
        .ok_or_else(|| ShopError::NotFound(weapon_id.to_string()))?;

    if record.owns(&weapon.name) {
        return Err(ShopError::AlreadyOwned(weapon.name));
    }
    if record.points < weapon.price {
        return Err(ShopError::InsufficientFunds {
            price: weapon.price,
            available: record.points,
        });
    }

    record.points -= weapon.price;
    record.owned_weapons.push(weapon.name.clone());
    record.current_weapon = weapon.name.clone();
    log::info!(
        "{} bought {} for {} points ({} left)",
        record.username,
        weapon.name,
        weapon.price,
        record.points
    );

    Ok(Receipt {
        weapon: weapon.name,
        price: weapon.price,
        points_left: record.points,
    })
}

/// Equip an owned weapon without charge
pub fn equip(record: &mut PlayerRecord, weapon_id: &str) -> Result<(), ShopError> {
    if !record.owns(weapon_id) {
        return Err(ShopError::NotOwned(weapon_id.to_string()));
    }
    record.current_weapon = weapon_id.to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WeaponTable;

    fn rich(points: u64) -> PlayerRecord {
        let mut record = PlayerRecord::new("pilot");
        record.points = points;
        record
    }

    #[test]
    fn test_purchase_debits_exact_price() {
        let catalog = WeaponTable::builtin();
        let mut record = rich(800);
        let receipt = purchase(&catalog, &mut record, "laser").unwrap();
        assert_eq!(receipt.price, 500);
        assert_eq!(record.points, 300);
        assert_eq!(record.current_weapon, "laser");
        assert!(record.owns("laser"));
    }

    #[test]
    fn test_insufficient_funds_changes_nothing() {
        let catalog = WeaponTable::builtin();
        let mut record = rich(499);
        let before = record.clone();
        let err = purchase(&catalog, &mut record, "laser").unwrap_err();
        assert_eq!(
            err,
            ShopError::InsufficientFunds {
                price: 500,
                available: 499
            }
        );
        assert_eq!(record, before);
    }

    #[test]
    fn test_unknown_weapon_rejected() {
        let catalog = WeaponTable::builtin();
        let mut record = rich(10_000);
        let before = record.clone();
        assert_eq!(
            purchase(&catalog, &mut record, "railgun"),
            Err(ShopError::NotFound("railgun".into()))
        );
        assert_eq!(record, before);
    }

    #[test]
    fn test_owned_weapon_not_charged_twice() {
        let catalog = WeaponTable::builtin();
        let mut record = rich(10_000);
        assert!(matches!(
            purchase(&catalog, &mut record, "basic_shot"),
            Err(ShopError::AlreadyOwned(_))
        ));
        assert_eq!(record.points, 10_000);
    }

    #[test]
    fn test_equip_requires_ownership() {
        let mut record = rich(0);
        assert!(equip(&mut record, "missile").is_err());
        record.owned_weapons.push("missile".into());
        equip(&mut record, "missile").unwrap();
        assert_eq!(record.current_weapon, "missile");
    }

    #[test]
    fn test_listing_flags() {
        let catalog = WeaponTable::builtin();
        let record = rich(600);
        let entries = listing(&catalog, &record);
        assert_eq!(entries.len(), 4);
        assert!(entries[0].owned && entries[0].equipped);
        assert!(entries[1].affordable && !entries[1].owned);
        assert!(!entries[2].affordable);
    }
}
