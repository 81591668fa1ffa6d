//! Kitchen preparation board
//!
//! Four buckets in the fixed forward order A PREPARAR → EM PREPARO → PRONTO →
//! ENTREGUE. Reorders and transfers are local board state only: nothing here
//! talks to the order service. Transfers and advances raise the order's
//! highlight flag; clearing it later is the caller's job (see
//! `state::KitchenManager`).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::domain::{KitchenOrder, KitchenStatus, Order, OrderItem};

use super::bucket::Bucket;
use super::error::{BoardError, BoardResult};

/// Where an order ended up after a transfer or advance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub id: String,
    pub from: KitchenStatus,
    pub to: KitchenStatus,
    /// Position in the destination bucket
    pub index: usize,
}

/// The kitchen kanban board
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KitchenBoard {
    #[serde(default)]
    to_prepare: Bucket<KitchenStatus>,
    #[serde(default)]
    in_progress: Bucket<KitchenStatus>,
    #[serde(default)]
    ready: Bucket<KitchenStatus>,
    #[serde(default)]
    delivered: Bucket<KitchenStatus>,
}

impl KitchenBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, status: KitchenStatus) -> &Bucket<KitchenStatus> {
        match status {
            KitchenStatus::ToPrepare => &self.to_prepare,
            KitchenStatus::InProgress => &self.in_progress,
            KitchenStatus::Ready => &self.ready,
            KitchenStatus::Delivered => &self.delivered,
        }
    }

    fn bucket_mut(&mut self, status: KitchenStatus) -> &mut Bucket<KitchenStatus> {
        match status {
            KitchenStatus::ToPrepare => &mut self.to_prepare,
            KitchenStatus::InProgress => &mut self.in_progress,
            KitchenStatus::Ready => &mut self.ready,
            KitchenStatus::Delivered => &mut self.delivered,
        }
    }

    /// Add an order to the bucket matching its status
    ///
    /// Any existing order with the same id is removed first, wherever it is.
    pub fn insert_order(&mut self, order: KitchenOrder) {
        debug!(id = %order.id, status = %order.status, "insert_order: called");
        for status in KitchenStatus::ALL {
            self.bucket_mut(status).remove_id(&order.id);
        }
        self.bucket_mut(order.status).push(order);
    }

    /// Locate an order and the bucket holding it
    pub fn find(&self, id: &str) -> Option<(KitchenStatus, &KitchenOrder)> {
        KitchenStatus::ALL
            .into_iter()
            .find_map(|status| self.bucket(status).get(id).map(|o| (status, o)))
    }

    pub fn len(&self) -> usize {
        KitchenStatus::ALL.into_iter().map(|s| self.bucket(s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reorder within one bucket; status and highlight are untouched
    pub fn move_within(&mut self, status: KitchenStatus, from: usize, to: usize) -> BoardResult<()> {
        debug!(%status, from, to, "move_within: called");
        self.bucket_mut(status).move_item(from, to, status)
    }

    /// Move the order at `from` in `source` to position `to` of the bucket
    /// named by `dest_list_id`
    ///
    /// The new status comes only from `dest_list_id`. An unknown id aborts
    /// before either bucket is touched and returns `Ok(None)`.
    pub fn transfer(
        &mut self,
        source: KitchenStatus,
        from: usize,
        to: usize,
        dest_list_id: &str,
    ) -> BoardResult<Option<TransferOutcome>> {
        debug!(%source, from, to, %dest_list_id, "transfer: called");
        let Some(dest) = KitchenStatus::from_list_id(dest_list_id) else {
            debug!(%dest_list_id, "transfer: unknown destination list, ignoring");
            return Ok(None);
        };

        let mut order = self.bucket_mut(source).take(from, source)?;
        order.status = dest;
        order.just_updated = true;
        let id = order.id.clone();
        let index = self.bucket_mut(dest).insert(to, order);

        info!(%id, from = %source, to = %dest, "order transferred");
        Ok(Some(TransferOutcome {
            id,
            from: source,
            to: dest,
            index,
        }))
    }

    /// Push an order one step forward in the sequence
    ///
    /// Buckets are scanned in forward order and the first match wins. The
    /// order is appended to the next bucket. Orders already delivered, and
    /// unknown ids, leave the board untouched and return `None`.
    pub fn advance(&mut self, id: &str) -> Option<TransferOutcome> {
        debug!(%id, "advance: called");
        let source = KitchenStatus::ALL
            .into_iter()
            .find(|status| self.bucket(*status).contains(id))?;
        let Some(dest) = source.next() else {
            debug!(%id, "advance: order already in terminal bucket");
            return None;
        };

        let mut order = self.bucket_mut(source).remove_id(id)?;
        order.status = dest;
        order.just_updated = true;
        let bucket = self.bucket_mut(dest);
        bucket.push(order);
        let index = bucket.len() - 1;

        info!(%id, from = %source, to = %dest, "order advanced");
        Some(TransferOutcome {
            id: id.to_string(),
            from: source,
            to: dest,
            index,
        })
    }

    /// Drop the highlight flag on an order, returning whether it was set
    pub fn clear_highlight(&mut self, id: &str) -> bool {
        for status in KitchenStatus::ALL {
            if let Some(order) = self.bucket_mut(status).get_mut(id) {
                let was_set = order.just_updated;
                order.just_updated = false;
                return was_set;
            }
        }
        false
    }

    /// Read a board from a YAML file
    ///
    /// The file is rebuilt bucket by bucket in forward order: every order
    /// takes the status of the bucket it was listed under, and an id seen
    /// again in a later bucket is dropped.
    pub fn load(path: &Path) -> BoardResult<Self> {
        debug!(path = %path.display(), "KitchenBoard::load: called");
        let content = std::fs::read_to_string(path).map_err(|e| BoardError::File(e.to_string()))?;
        let raw: Self = serde_yaml::from_str(&content).map_err(|e| BoardError::File(e.to_string()))?;
        Ok(raw.rebuilt())
    }

    fn rebuilt(mut self) -> Self {
        let mut board = Self::new();
        for status in KitchenStatus::ALL {
            let listed = std::mem::take(self.bucket_mut(status));
            for mut order in listed.into_orders() {
                if let Some((kept, _)) = board.find(&order.id) {
                    warn!(id = %order.id, %kept, dropped = %status, "duplicate order id on kitchen board, keeping first");
                    continue;
                }
                if order.status != status {
                    debug!(id = %order.id, listed = %order.status, %status, "rebuilt: status forced to bucket");
                    order.status = status;
                }
                order.just_updated = false;
                board.bucket_mut(status).push(order);
            }
        }
        board
    }

    /// Write the board to a YAML file (highlight flags are not written)
    pub fn save(&self, path: &Path) -> BoardResult<()> {
        debug!(path = %path.display(), "KitchenBoard::save: called");
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| BoardError::File(e.to_string()))?;
            }
        }
        let content = serde_yaml::to_string(self).map_err(|e| BoardError::File(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| BoardError::File(e.to_string()))
    }

    /// A small demo board for a fresh kitchen
    pub fn sample(now: DateTime<Utc>) -> Self {
        let mut board = Self::new();
        let order = |id: &str, number: u32, status, minutes_ago: i64, items: &[(&str, u32)]| {
            items.iter().fold(
                Order::new(id, status)
                    .with_display_number(number.to_string())
                    .with_timestamp(now - Duration::minutes(minutes_ago)),
                |o, (name, qty)| o.with_item(OrderItem::new(*name, *qty, 0.0)),
            )
        };
        board.insert_order(order(
            "1",
            100,
            KitchenStatus::ToPrepare,
            5,
            &[("Pizza Margherita", 1), ("Batata Frita", 1)],
        ));
        board.insert_order(order(
            "2",
            101,
            KitchenStatus::ToPrepare,
            3,
            &[("Refrigerante 600ml", 2), ("Pizza Pepperoni", 1)],
        ));
        board.insert_order(order(
            "3",
            98,
            KitchenStatus::InProgress,
            9,
            &[("Pizza Quatro Queijos", 1)],
        ));
        board.insert_order(order("4", 97, KitchenStatus::Ready, 15, &[("Pizza Chocolate", 1)]));
        board.insert_order(order("5", 96, KitchenStatus::Delivered, 20, &[("Refrigerante 2L", 1)]));
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn board_with(to_prepare: &[&str], in_progress: &[&str]) -> KitchenBoard {
        let mut board = KitchenBoard::new();
        for id in to_prepare {
            board.insert_order(Order::new(*id, KitchenStatus::ToPrepare));
        }
        for id in in_progress {
            board.insert_order(Order::new(*id, KitchenStatus::InProgress));
        }
        board
    }

    #[test]
    fn test_transfer_moves_and_updates_status() {
        let mut board = board_with(&["100", "101"], &[]);

        let outcome = board
            .transfer(KitchenStatus::ToPrepare, 0, 0, "inProgressList")
            .unwrap()
            .unwrap();
        assert_eq!(outcome.id, "100");
        assert_eq!(outcome.to, KitchenStatus::InProgress);

        assert_eq!(board.bucket(KitchenStatus::ToPrepare).ids(), vec!["101"]);
        let moved = board.bucket(KitchenStatus::InProgress).get("100").unwrap();
        assert_eq!(moved.status, KitchenStatus::InProgress);
        assert!(moved.just_updated);
    }

    #[test]
    fn test_transfer_unknown_destination_is_noop() {
        let mut board = board_with(&["100", "101"], &["98"]);
        let before = board.clone();
        let outcome = board.transfer(KitchenStatus::ToPrepare, 0, 0, "bogusList").unwrap();
        assert!(outcome.is_none());
        assert_eq!(board, before);
    }

    #[test]
    fn test_transfer_bad_index_leaves_board_intact() {
        let mut board = board_with(&["100"], &[]);
        let before = board.clone();
        assert!(board.transfer(KitchenStatus::ToPrepare, 4, 0, "readyList").is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn test_transfer_inserts_at_position() {
        let mut board = board_with(&["100"], &["98", "99"]);
        board
            .transfer(KitchenStatus::ToPrepare, 0, 1, "inProgressList")
            .unwrap();
        assert_eq!(board.bucket(KitchenStatus::InProgress).ids(), vec!["98", "100", "99"]);
    }

    #[test]
    fn test_move_within_keeps_status() {
        let mut board = board_with(&["a", "b", "c"], &[]);
        board.move_within(KitchenStatus::ToPrepare, 2, 0).unwrap();
        let bucket = board.bucket(KitchenStatus::ToPrepare);
        assert_eq!(bucket.ids(), vec!["c", "a", "b"]);
        assert!(bucket.iter().all(|o| o.status == KitchenStatus::ToPrepare && !o.just_updated));
    }

    #[test]
    fn test_advance_walks_the_sequence() {
        let mut board = board_with(&["1"], &[]);
        let expected = [KitchenStatus::InProgress, KitchenStatus::Ready, KitchenStatus::Delivered];
        for status in expected {
            let outcome = board.advance("1").unwrap();
            assert_eq!(outcome.to, status);
            let (found, order) = board.find("1").unwrap();
            assert_eq!(found, status);
            assert_eq!(order.status, status);
        }
    }

    #[test]
    fn test_advance_appends_to_destination() {
        let mut board = board_with(&["1"], &["2", "3"]);
        let outcome = board.advance("1").unwrap();
        assert_eq!(outcome.index, 2);
        assert_eq!(board.bucket(KitchenStatus::InProgress).ids(), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_advance_terminal_and_unknown_are_noops() {
        let mut board = board_with(&["1"], &[]);
        board.insert_order(Order::new("9", KitchenStatus::Delivered));
        let before = board.clone();

        assert!(board.advance("9").is_none());
        assert!(board.advance("missing").is_none());
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_highlight() {
        let mut board = board_with(&["1"], &[]);
        board.advance("1");
        assert!(board.clear_highlight("1"));
        assert!(!board.clear_highlight("1"));
        assert!(!board.find("1").unwrap().1.just_updated);
        assert!(!board.clear_highlight("nope"));
    }

    #[test]
    fn test_insert_order_keeps_ids_exclusive() {
        let mut board = board_with(&["1"], &[]);
        board.insert_order(Order::new("1", KitchenStatus::Ready));
        assert_eq!(board.len(), 1);
        assert_eq!(board.find("1").unwrap().0, KitchenStatus::Ready);
    }

    #[test]
    fn test_save_load_roundtrip_drops_highlight() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("kitchen.yml");

        let mut board = KitchenBoard::sample(Utc::now());
        board.advance("1");
        board.save(&path).unwrap();

        let loaded = KitchenBoard::load(&path).unwrap();
        assert_eq!(loaded.len(), board.len());
        let (status, order) = loaded.find("1").unwrap();
        assert_eq!(status, KitchenStatus::InProgress);
        assert!(!order.just_updated);
    }

    #[test]
    fn test_load_keeps_first_bucket_for_duplicate_id() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("kitchen.yml");
        let yaml = r#"
to-prepare:
  - id: "1"
    displayNumber: "100"
    status: A PREPARAR
ready:
  - id: "1"
    displayNumber: "100"
    status: PRONTO
  - id: "2"
    displayNumber: "101"
    status: PRONTO
"#;
        std::fs::write(&path, yaml).unwrap();

        let board = KitchenBoard::load(&path).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board.bucket(KitchenStatus::ToPrepare).ids(), vec!["1"]);
        assert_eq!(board.bucket(KitchenStatus::Ready).ids(), vec!["2"]);
    }

    #[test]
    fn test_load_forces_status_to_bucket() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("kitchen.yml");
        let yaml = r#"
in-progress:
  - id: "7"
    displayNumber: "107"
    status: ENTREGUE
"#;
        std::fs::write(&path, yaml).unwrap();

        let mut board = KitchenBoard::load(&path).unwrap();
        let (bucket, order) = board.find("7").unwrap();
        assert_eq!(bucket, KitchenStatus::InProgress);
        assert_eq!(order.status, KitchenStatus::InProgress);

        let outcome = board.advance("7").unwrap();
        assert_eq!(outcome.to, KitchenStatus::Ready);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let temp = tempdir().unwrap();
        let result = KitchenBoard::load(&temp.path().join("nope.yml"));
        assert!(matches!(result, Err(BoardError::File(_))));
    }

    #[test]
    fn test_sample_board_layout() {
        let board = KitchenBoard::sample(Utc::now());
        assert_eq!(board.bucket(KitchenStatus::ToPrepare).ids(), vec!["1", "2"]);
        assert_eq!(board.bucket(KitchenStatus::InProgress).len(), 1);
        assert_eq!(board.bucket(KitchenStatus::Ready).len(), 1);
        assert_eq!(board.bucket(KitchenStatus::Delivered).len(), 1);
    }

    fn status_strategy() -> impl Strategy<Value = KitchenStatus> {
        prop::sample::select(KitchenStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn transfer_conserves_orders(
            source_len in 1usize..6,
            dest_len in 0usize..6,
            from_seed in any::<usize>(),
            to in 0usize..8,
            source in status_strategy(),
            dest in status_strategy(),
        ) {
            prop_assume!(source != dest);
            let mut board = KitchenBoard::new();
            for i in 0..source_len {
                board.insert_order(Order::new(format!("s{i}"), source));
            }
            for i in 0..dest_len {
                board.insert_order(Order::new(format!("d{i}"), dest));
            }
            let from = from_seed % source_len;

            let outcome = board.transfer(source, from, to, dest.list_id()).unwrap().unwrap();

            prop_assert_eq!(board.bucket(source).len() + board.bucket(dest).len(), source_len + dest_len);
            prop_assert_eq!(board.bucket(source).len(), source_len - 1);
            let moved = board.bucket(dest).get(&outcome.id).unwrap();
            prop_assert_eq!(moved.status, dest);
            prop_assert_eq!(board.len(), source_len + dest_len);
        }
    }
}
