//! Table and column names for the Twimight store
//!
//! Each submodule declares one table: its name, the names of its columns, and
//! the [`TableDef`] built from those names. Data-access code should build its
//! queries from these constants rather than repeating the literals.

use crate::database::core::{ColumnDef, ColumnType, TableDef};

/// Bluetooth MAC addresses of known peers and contact history
pub mod macs {
    use super::*;

    pub const TABLE: &str = "macs";

    pub const COL_MAC: &str = "mac";
    pub const COL_ATTEMPTS: &str = "attempts";
    pub const COL_SUCCESSFUL: &str = "successful";
    pub const COL_ACTIVE: &str = "active";
    pub const COL_LAST: &str = "last";

    pub const DEFINITION: TableDef = TableDef {
        name: TABLE,
        columns: &[
            ColumnDef::new(COL_MAC, ColumnType::String),
            ColumnDef::new(COL_ATTEMPTS, ColumnType::Integer),
            ColumnDef::new(COL_SUCCESSFUL, ColumnType::Integer),
            ColumnDef::new(COL_ACTIVE, ColumnType::Integer),
            ColumnDef::new(COL_LAST, ColumnType::Integer),
        ],
    };
}

/// Location samples
pub mod locations {
    use super::*;

    pub const TABLE: &str = "locations";

    pub const COL_TIMESTAMP: &str = "timestamp";
    pub const COL_LAT: &str = "lat";
    pub const COL_LNG: &str = "lng";
    pub const COL_ACCURACY: &str = "accuracy";
    pub const COL_LOC_DATE: &str = "loc_date";
    pub const COL_PROVIDER: &str = "provider";
    pub const COL_NETWORK: &str = "network";
    pub const COL_EVENT: &str = "event";
    pub const COL_LINK: &str = "link";

    pub const DEFINITION: TableDef = TableDef {
        name: TABLE,
        columns: &[
            ColumnDef::new(COL_TIMESTAMP, ColumnType::Integer).not_null(),
            ColumnDef::new(COL_LAT, ColumnType::Real),
            ColumnDef::new(COL_LNG, ColumnType::Real),
            ColumnDef::new(COL_ACCURACY, ColumnType::Integer),
            ColumnDef::new(COL_LOC_DATE, ColumnType::Integer),
            ColumnDef::new(COL_PROVIDER, ColumnType::String),
            ColumnDef::new(COL_NETWORK, ColumnType::String),
            ColumnDef::new(COL_EVENT, ColumnType::String),
            ColumnDef::new(COL_LINK, ColumnType::String),
        ],
    };
}

/// Local copy of the certificate revocation list
pub mod revocations {
    use super::*;

    pub const TABLE: &str = "revocations";

    pub const COL_SERIAL: &str = "serial";
    /// Expiry of the entry, unix epoch
    pub const COL_UNTIL: &str = "until";

    pub const DEFINITION: TableDef = TableDef {
        name: TABLE,
        columns: &[
            ColumnDef::new(COL_SERIAL, ColumnType::String).not_null(),
            ColumnDef::new(COL_UNTIL, ColumnType::Integer).not_null(),
        ],
    };
}

/// Public keys of contacts
pub mod friends_keys {
    use super::*;

    pub const TABLE: &str = "friends_keys";

    pub const COL_TWITTER_ID: &str = "twitter_id";
    pub const COL_KEY: &str = "key";

    pub const DEFINITION: TableDef = TableDef {
        name: TABLE,
        columns: &[
            ColumnDef::new(COL_TWITTER_ID, ColumnType::BigInt).not_null(),
            ColumnDef::new(COL_KEY, ColumnType::Text).not_null(),
        ],
    };
}

/// Tweets, including disaster tweets exchanged between peers
pub mod tweets {
    use super::*;

    pub const TABLE: &str = "tweets";

    pub const COL_TEXT: &str = "text";
    pub const COL_USER: &str = "user_id";
    pub const COL_SCREENNAME: &str = "screenname";
    /// Remote tweet id, unique when present
    pub const COL_TID: &str = "t_id";
    pub const COL_REPLYTO: &str = "reply_to";
    pub const COL_FAVORITED: &str = "favorited";
    pub const COL_RETWEETED: &str = "retweeted";
    pub const COL_RETWEETCOUNT: &str = "retweet_count";
    pub const COL_RETWEETED_BY: &str = "retweeted_by";
    pub const COL_MENTIONS: &str = "mentions";
    pub const COL_LAT: &str = "lat";
    pub const COL_LNG: &str = "lng";
    pub const COL_CREATED: &str = "created";
    pub const COL_RECEIVED: &str = "received";
    pub const COL_SOURCE: &str = "source";
    pub const COL_FLAGS: &str = "flags";
    /// Buffered-for-send bitfield
    pub const COL_BUFFER: &str = "buffer";
    pub const COL_MEDIA: &str = "media";
    pub const COL_HTMLS: &str = "htmls";
    pub const COL_ISDISASTER: &str = "is_disaster";
    pub const COL_DISASTERID: &str = "d_id";
    pub const COL_ISVERIFIED: &str = "is_verified";
    pub const COL_SIGNATURE: &str = "signature";
    pub const COL_CERTIFICATE: &str = "certificate";

    pub const DEFINITION: TableDef = TableDef {
        name: TABLE,
        columns: &[
            ColumnDef::new(COL_TEXT, ColumnType::String).not_null(),
            ColumnDef::new(COL_USER, ColumnType::BigInt),
            ColumnDef::new(COL_SCREENNAME, ColumnType::String),
            ColumnDef::new(COL_TID, ColumnType::BigInt).unique(),
            ColumnDef::new(COL_REPLYTO, ColumnType::BigInt),
            ColumnDef::new(COL_FAVORITED, ColumnType::Int),
            ColumnDef::new(COL_RETWEETED, ColumnType::Int),
            ColumnDef::new(COL_RETWEETCOUNT, ColumnType::Int),
            ColumnDef::new(COL_RETWEETED_BY, ColumnType::String),
            ColumnDef::new(COL_MENTIONS, ColumnType::Int),
            ColumnDef::new(COL_LAT, ColumnType::Real),
            ColumnDef::new(COL_LNG, ColumnType::Real),
            ColumnDef::new(COL_CREATED, ColumnType::Integer),
            ColumnDef::new(COL_RECEIVED, ColumnType::Integer),
            ColumnDef::new(COL_SOURCE, ColumnType::String),
            ColumnDef::new(COL_FLAGS, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_BUFFER, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_MEDIA, ColumnType::String),
            ColumnDef::new(COL_HTMLS, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_ISDISASTER, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_DISASTERID, ColumnType::Integer),
            ColumnDef::new(COL_ISVERIFIED, ColumnType::Integer),
            ColumnDef::new(COL_SIGNATURE, ColumnType::String),
            ColumnDef::new(COL_CERTIFICATE, ColumnType::String),
        ],
    };
}

/// Twitter user profiles
pub mod users {
    use super::*;

    pub const TABLE: &str = "users";

    pub const COL_SCREENNAME: &str = "screenname";
    /// Remote user id, unique when present
    pub const COL_ID: &str = "user_id";
    pub const COL_NAME: &str = "name";
    pub const COL_LANG: &str = "lang";
    pub const COL_DESCRIPTION: &str = "description";
    pub const COL_IMAGEURL: &str = "imageurl";
    pub const COL_STATUSES: &str = "statuses";
    pub const COL_FOLLOWERS: &str = "followers";
    pub const COL_FRIENDS: &str = "friends";
    pub const COL_LISTED: &str = "listed";
    pub const COL_FAVORITES: &str = "favorites";
    pub const COL_LOCATION: &str = "location";
    pub const COL_UTCOFFSET: &str = "utcoffset";
    pub const COL_TIMEZONE: &str = "timezone";
    pub const COL_URL: &str = "url";
    pub const COL_CREATED: &str = "created";
    pub const COL_PROTECTED: &str = "protected";
    pub const COL_VERIFIED: &str = "verified";
    pub const COL_ISFOLLOWER: &str = "isfollower";
    pub const COL_ISFRIEND: &str = "isfriend";
    pub const COL_ISDISASTER_PEER: &str = "isdisasterpeer";
    pub const COL_IS_SEARCH_RESULT: &str = "is_search_result";
    pub const COL_FOLLOWREQUEST: &str = "followrequest";
    pub const COL_PROFILEIMAGE_PATH: &str = "profile_image_path";
    pub const COL_LASTUPDATE: &str = "last_update";
    pub const COL_LAST_PICTURE_UPDATE: &str = "last_picture_update";
    pub const COL_FLAGS: &str = "flags";

    pub const DEFINITION: TableDef = TableDef {
        name: TABLE,
        columns: &[
            ColumnDef::new(COL_SCREENNAME, ColumnType::String).not_null(),
            ColumnDef::new(COL_ID, ColumnType::BigInt).unique(),
            ColumnDef::new(COL_NAME, ColumnType::String),
            ColumnDef::new(COL_LANG, ColumnType::String),
            ColumnDef::new(COL_DESCRIPTION, ColumnType::String),
            ColumnDef::new(COL_IMAGEURL, ColumnType::String),
            ColumnDef::new(COL_STATUSES, ColumnType::Integer),
            ColumnDef::new(COL_FOLLOWERS, ColumnType::Integer),
            ColumnDef::new(COL_FRIENDS, ColumnType::Integer),
            ColumnDef::new(COL_LISTED, ColumnType::Integer),
            ColumnDef::new(COL_FAVORITES, ColumnType::Integer),
            ColumnDef::new(COL_LOCATION, ColumnType::String),
            ColumnDef::new(COL_UTCOFFSET, ColumnType::String),
            ColumnDef::new(COL_TIMEZONE, ColumnType::String),
            ColumnDef::new(COL_URL, ColumnType::String),
            ColumnDef::new(COL_CREATED, ColumnType::Integer),
            ColumnDef::new(COL_PROTECTED, ColumnType::Integer),
            ColumnDef::new(COL_VERIFIED, ColumnType::Integer),
            ColumnDef::new(COL_ISFOLLOWER, ColumnType::Integer),
            ColumnDef::new(COL_ISFRIEND, ColumnType::Integer),
            ColumnDef::new(COL_ISDISASTER_PEER, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_IS_SEARCH_RESULT, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_FOLLOWREQUEST, ColumnType::Integer),
            ColumnDef::new(COL_PROFILEIMAGE_PATH, ColumnType::String),
            ColumnDef::new(COL_LASTUPDATE, ColumnType::Integer),
            ColumnDef::new(COL_LAST_PICTURE_UPDATE, ColumnType::Integer),
            ColumnDef::new(COL_FLAGS, ColumnType::Integer).default_zero(),
        ],
    };
}

/// Direct messages, including disaster messages
pub mod dms {
    use super::*;

    pub const TABLE: &str = "dms";

    pub const COL_TEXT: &str = "text";
    pub const COL_SENDER: &str = "sender";
    pub const COL_RECEIVER: &str = "receiver";
    pub const COL_RECEIVER_SCREENNAME: &str = "receiver_screenname";
    /// Remote message id, unique when present
    pub const COL_DMID: &str = "dm_id";
    pub const COL_CREATED: &str = "created";
    pub const COL_RECEIVED: &str = "received";
    pub const COL_FLAGS: &str = "flags";
    pub const COL_BUFFER: &str = "buffer";
    pub const COL_ISDISASTER: &str = "is_disaster";
    pub const COL_DISASTERID: &str = "d_id";
    pub const COL_ISVERIFIED: &str = "is_verified";
    pub const COL_SIGNATURE: &str = "signature";
    pub const COL_CRYPTEXT: &str = "cryptext";
    pub const COL_CERTIFICATE: &str = "certificate";

    pub const DEFINITION: TableDef = TableDef {
        name: TABLE,
        columns: &[
            ColumnDef::new(COL_TEXT, ColumnType::String),
            ColumnDef::new(COL_SENDER, ColumnType::BigInt),
            ColumnDef::new(COL_RECEIVER, ColumnType::BigInt),
            ColumnDef::new(COL_RECEIVER_SCREENNAME, ColumnType::String),
            ColumnDef::new(COL_DMID, ColumnType::BigInt).unique(),
            ColumnDef::new(COL_CREATED, ColumnType::Integer),
            ColumnDef::new(COL_RECEIVED, ColumnType::Integer),
            ColumnDef::new(COL_FLAGS, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_BUFFER, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_ISDISASTER, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_DISASTERID, ColumnType::Integer),
            ColumnDef::new(COL_ISVERIFIED, ColumnType::Integer),
            ColumnDef::new(COL_SIGNATURE, ColumnType::String),
            ColumnDef::new(COL_CRYPTEXT, ColumnType::String),
            ColumnDef::new(COL_CERTIFICATE, ColumnType::String),
        ],
    };
}

/// Web pages linked from tweets, cached for offline reading
pub mod htmls {
    use super::*;

    pub const TABLE: &str = "htmls";

    pub const COL_URL: &str = "url";
    pub const COL_TID: &str = "tid";
    pub const COL_USER: &str = "user_id";
    pub const COL_DOWNLOADED: &str = "downloaded";
    pub const COL_FORCED: &str = "forced";
    pub const COL_TRIES: &str = "tries";
    pub const COL_FILENAME: &str = "filename";

    pub const DEFINITION: TableDef = TableDef {
        name: TABLE,
        columns: &[
            ColumnDef::new(COL_URL, ColumnType::String).not_null(),
            ColumnDef::new(COL_TID, ColumnType::String).not_null(),
            ColumnDef::new(COL_USER, ColumnType::String).not_null(),
            ColumnDef::new(COL_DOWNLOADED, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_FORCED, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_TRIES, ColumnType::Integer).default_zero(),
            ColumnDef::new(COL_FILENAME, ColumnType::String),
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_column_counts() {
        assert_eq!(macs::DEFINITION.columns.len(), 5);
        assert_eq!(locations::DEFINITION.columns.len(), 9);
        assert_eq!(revocations::DEFINITION.columns.len(), 2);
        assert_eq!(friends_keys::DEFINITION.columns.len(), 2);
        assert_eq!(tweets::DEFINITION.columns.len(), 24);
        assert_eq!(users::DEFINITION.columns.len(), 27);
        assert_eq!(dms::DEFINITION.columns.len(), 15);
        assert_eq!(htmls::DEFINITION.columns.len(), 7);
    }

    #[test]
    fn test_column_names_unique_per_table() {
        for table in [
            macs::DEFINITION,
            locations::DEFINITION,
            revocations::DEFINITION,
            friends_keys::DEFINITION,
            tweets::DEFINITION,
            users::DEFINITION,
            dms::DEFINITION,
            htmls::DEFINITION,
        ] {
            let names = table.column_names();
            let distinct: HashSet<_> = names.iter().collect();
            assert_eq!(names.len(), distinct.len(), "duplicate column in {}", table.name);
        }
    }

    #[test]
    fn test_unique_remote_ids() {
        let unique: Vec<(&str, &str)> = [tweets::DEFINITION, users::DEFINITION, dms::DEFINITION]
            .iter()
            .flat_map(|t| {
                t.columns
                    .iter()
                    .filter(|c| c.unique)
                    .map(move |c| (t.name, c.name))
            })
            .collect();
        assert_eq!(
            unique,
            vec![
                (tweets::TABLE, tweets::COL_TID),
                (users::TABLE, users::COL_ID),
                (dms::TABLE, dms::COL_DMID)
            ]
        );
    }
}
