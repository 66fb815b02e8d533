use diesel::expression::AsExpression;
use diesel::deserialize::FromSqlRow;
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};

/// Implements diesel's `FromSql`/`ToSql` for a serde type stored as JSON in a TEXT column
///
/// The type must also derive `AsExpression` and `FromSqlRow` with `sql_type = Text`.
macro_rules! json_text_column {
    ($ty:ty) => {
        impl diesel::deserialize::FromSql<diesel::sql_types::Text, diesel::sqlite::Sqlite> for $ty {
            fn from_sql(value: diesel::sqlite::SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
                let text = <String as diesel::deserialize::FromSql<diesel::sql_types::Text, diesel::sqlite::Sqlite>>::from_sql(value)?;
                Ok(serde_json::from_str(&text)?)
            }
        }

        impl diesel::serialize::ToSql<diesel::sql_types::Text, diesel::sqlite::Sqlite> for $ty {
            fn to_sql<'b>(&'b self, out: &mut diesel::serialize::Output<'b, '_, diesel::sqlite::Sqlite>) -> diesel::serialize::Result {
                out.set_value(serde_json::to_string(self)?);
                Ok(diesel::serialize::IsNull::No)
            }
        }
    };
}

pub(crate) use json_text_column;

/// The free-form tags attached to a card, stored as a JSON array
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct TagList(pub Vec<String>);

json_text_column!(TagList);

impl TagList {
    /// Trims every tag and drops the empty ones
    pub fn normalized(tags: Vec<String>) -> Self {
        TagList(
            tags.into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }
}
