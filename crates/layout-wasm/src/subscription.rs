//! 状態購読管理モジュール
//!
//! セッション状態・レイアウトの変更を監視し、コールバックを呼び出す

use js_sys::Function;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// 購読対象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// 編集モード・選択・ドラッグ状態
    Session,
    /// 配置テーブル（export と同じ内容）
    Layout,
}

impl std::str::FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "session" => Ok(Topic::Session),
            "layout" => Ok(Topic::Layout),
            _ => Err(format!("Unknown subscription topic: {s}")),
        }
    }
}

/// 購読情報
pub struct Subscription {
    pub topic: Topic,
    pub callback: Function,
    pub last_hash: u64,
}

/// 購読マネージャー
pub struct SubscriptionManager {
    subscriptions: HashMap<u32, Subscription>,
    next_id: u32,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self {
            subscriptions: HashMap::new(),
            next_id: 1,
        }
    }

    /// `current_hash` は登録時点の値。変化するまで通知しない
    pub fn subscribe(&mut self, topic: Topic, callback: Function, current_hash: u64) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.subscriptions.insert(
            id,
            Subscription {
                topic,
                callback,
                last_hash: current_hash,
            },
        );
        id
    }

    pub fn unsubscribe(&mut self, id: u32) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// 全購読の可変参照を走査
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Subscription> {
        self.subscriptions.values_mut()
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// シリアライズ結果のハッシュを計算
pub fn calculate_hash<T: Serialize>(value: &T) -> u64 {
    let json = serde_json::to_string(value).unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    json.hash(&mut hasher);
    hasher.finish()
}
