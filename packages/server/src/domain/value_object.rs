//! 値オブジェクト
//!
//! 空文字を許さない文字列ラッパーと、接続 ID・タイムスタンプを定義します。
//! 生の `String` はここで検証され、以降の層では常に妥当な値として扱われます。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// 空文字を拒否する文字列値オブジェクトを定義するマクロ
macro_rules! non_empty_string {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// 空文字でなければ生成する
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                if value.is_empty() {
                    return Err(ValueObjectError::Empty($field));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

non_empty_string!(
    /// ルーム名（大文字小文字を区別する任意の非空文字列）
    RoomName,
    "room"
);

non_empty_string!(
    /// ユーザー名（セッションの本人性とは照合しない）
    Username,
    "username"
);

non_empty_string!(
    /// メッセージ本文
    MessageText,
    "text"
);

non_empty_string!(
    /// 表示用の時刻文字列（クライアント指定またはサーバー生成の `HH:MM`）
    DisplayTime,
    "time"
);

/// ルームの共有パスワード
///
/// `Debug` 出力は伏せ字になる。
#[derive(Clone, PartialEq, Eq)]
pub struct RoomPassword(String);

impl RoomPassword {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::Empty("password"));
        }
        Ok(Self(value))
    }

    /// 入力されたパスワードと完全一致するか
    pub fn matches(&self, other: &RoomPassword) -> bool {
        self.0 == other.0
    }
}

impl TryFrom<String> for RoomPassword {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Debug for RoomPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RoomPassword(***)")
    }
}

/// トランスポートが割り当てる接続 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
