use medication_reminders_domain::{Entity, ID};
use std::sync::{Mutex, MutexGuard};

/// Useful functions for creating inmemory repositories

fn lock<T>(collection: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    collection.lock().unwrap_or_else(|e| e.into_inner())
}

pub fn insert<T: Clone>(val: &T, collection: &Mutex<Vec<T>>) {
    lock(collection).push(val.clone());
}

pub fn find<T: Clone + Entity>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    lock(collection)
        .iter()
        .find(|item| item.id() == val_id)
        .cloned()
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(collection: &Mutex<Vec<T>>, mut compare: F) -> Vec<T> {
    lock(collection)
        .iter()
        .filter(|item| compare(item))
        .cloned()
        .collect()
}

pub fn find_all<T: Clone>(collection: &Mutex<Vec<T>>) -> Vec<T> {
    lock(collection).clone()
}

/// Applies `update` to the entity with the given id. Returns false if it was not found.
pub fn update<T: Entity, U: FnOnce(&mut T)>(
    val_id: &ID,
    collection: &Mutex<Vec<T>>,
    update: U,
) -> bool {
    let mut collection = lock(collection);
    match collection.iter_mut().find(|item| item.id() == val_id) {
        Some(item) => {
            update(item);
            true
        }
        None => false,
    }
}
