//! Condition algebra: filter expressions compiled to SQL fragments with
//! numbered positional arguments.
//!
//! Placeholders are `?N`, allocated in traversal order by [`Args`]. A
//! fragment may refer back to a placeholder allocated earlier in the same
//! statement, which is how the UPDATE guard reuses the SET values.

use rusqlite::types::Value;

/// Ordered argument list shared by every fragment of one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value and return its placeholder.
    pub fn push(&mut self, value: impl Into<Value>) -> String {
        self.0.push(value.into());
        format!("?{}", self.0.len())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logical {
    And,
    Or,
}

/// Resolve a natural key to a surrogate id inside the statement:
/// `(SELECT COALESCE((SELECT expr FROM table WHERE cond), zero))`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubLookup {
    pub expr: &'static str,
    pub table: &'static str,
    pub cond: Condition,
    pub zero: Value,
}

impl SubLookup {
    /// Look up `id` in `table`, falling back to 0 so a missing key surfaces
    /// as a foreign-key violation rather than a NULL.
    pub fn id(table: &'static str, cond: Condition) -> Self {
        Self {
            expr: "id",
            table,
            cond,
            zero: Value::Integer(0),
        }
    }

    pub fn build(&self, args: &mut Args) -> String {
        let cond = self.cond.build(args);
        let zero = args.push(self.zero.clone());
        format!(
            "(SELECT COALESCE((SELECT {} FROM {} WHERE {cond}), {zero}))",
            self.expr, self.table
        )
    }
}

/// Right-hand side of an equality.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    Lookup(Box<SubLookup>),
}

impl Operand {
    pub fn build(&self, args: &mut Args) -> String {
        match self {
            Operand::Value(v) => args.push(v.clone()),
            Operand::Lookup(l) => l.build(args),
        }
    }
}

impl From<SubLookup> for Operand {
    fn from(l: SubLookup) -> Self {
        Operand::Lookup(Box::new(l))
    }
}

/// Element of an ordered condition list.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Switches the connective for every following element.
    Op(Logical),
    Cond(Condition),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `key = value`
    Eq(&'static str, Operand),
    /// `key IS DISTINCT FROM value`
    Distinct(&'static str, Value),
    /// `key IS NOT DISTINCT FROM value`
    NotDistinct(&'static str, Value),
    /// `key IS NULL`
    Null(&'static str),
    /// `key IS NOT NULL`
    NotNull(&'static str),
    /// `key IS TRUE|FALSE`
    Is(&'static str, bool),
    /// `key IS NOT TRUE|FALSE`
    IsNot(&'static str, bool),
    /// Case-insensitive pattern match.
    Like(&'static str, String),
    /// Every member must hold. An empty group is no condition at all.
    All(Vec<Condition>),
    /// Members joined by `OR` unless an [`Item::Op`] switches the connective.
    List(Vec<Item>),
    /// `key IN (SELECT DISTINCT expr FROM from WHERE cond)`, filtering rows
    /// by a condition over another table.
    Cross {
        key: &'static str,
        expr: &'static str,
        from: &'static str,
        cond: Box<Condition>,
    },
}

impl Condition {
    /// The empty condition; builds to an empty fragment.
    pub fn none() -> Self {
        Condition::All(Vec::new())
    }

    pub fn eq(key: &'static str, value: impl Into<Value>) -> Self {
        Condition::Eq(key, Operand::Value(value.into()))
    }

    pub fn eq_lookup(key: &'static str, lookup: SubLookup) -> Self {
        Condition::Eq(key, lookup.into())
    }

    /// `key = id`, or `key = <lookup>` when only the natural key is known.
    pub fn reference(key: &'static str, id: Option<i64>, lookup: Option<SubLookup>) -> Self {
        match (id, lookup) {
            (Some(id), _) => Condition::eq(key, id),
            (None, Some(l)) => Condition::eq_lookup(key, l),
            (None, None) => Condition::none(),
        }
    }

    pub fn distinct(key: &'static str, value: impl Into<Value>) -> Self {
        Condition::Distinct(key, value.into())
    }

    pub fn not_distinct(key: &'static str, value: impl Into<Value>) -> Self {
        Condition::NotDistinct(key, value.into())
    }

    pub fn like(key: &'static str, pattern: impl Into<String>) -> Self {
        Condition::Like(key, pattern.into())
    }

    pub fn all(conds: Vec<Condition>) -> Self {
        Condition::All(conds)
    }

    /// OR-list.
    pub fn any(conds: Vec<Condition>) -> Self {
        Condition::List(conds.into_iter().map(Item::Cond).collect())
    }

    /// AND-list, spelled with an explicit leading marker.
    pub fn and(conds: Vec<Condition>) -> Self {
        let mut items = vec![Item::Op(Logical::And)];
        items.extend(conds.into_iter().map(Item::Cond));
        Condition::List(items)
    }

    /// `key = id1 OR key = id2 ...`
    pub fn any_id(key: &'static str, ids: impl IntoIterator<Item = i64>) -> Self {
        Condition::any(ids.into_iter().map(|id| Condition::eq(key, id)).collect())
    }

    pub fn cross(
        key: &'static str,
        expr: &'static str,
        from: &'static str,
        cond: Condition,
    ) -> Self {
        Condition::Cross {
            key,
            expr,
            from,
            cond: Box::new(cond),
        }
    }

    /// True when the condition builds to an empty fragment.
    pub fn is_empty(&self) -> bool {
        match self {
            Condition::All(conds) => conds.iter().all(Condition::is_empty),
            Condition::List(items) => items.iter().all(|i| match i {
                Item::Op(_) => true,
                Item::Cond(c) => c.is_empty(),
            }),
            _ => false,
        }
    }

    /// Compile to a SQL fragment, appending arguments in placeholder order.
    pub fn build(&self, args: &mut Args) -> String {
        match self {
            Condition::Eq(key, operand) => format!("{key} = {}", operand.build(args)),
            Condition::Distinct(key, v) => {
                format!("{key} IS DISTINCT FROM {}", args.push(v.clone()))
            }
            Condition::NotDistinct(key, v) => {
                format!("{key} IS NOT DISTINCT FROM {}", args.push(v.clone()))
            }
            Condition::Null(key) => format!("{key} IS NULL"),
            Condition::NotNull(key) => format!("{key} IS NOT NULL"),
            Condition::Is(key, b) => format!("{key} IS {}", bool_sql(*b)),
            Condition::IsNot(key, b) => format!("{key} IS NOT {}", bool_sql(*b)),
            Condition::Like(key, pattern) => {
                format!("{key} LIKE {}", args.push(pattern.clone()))
            }
            Condition::All(conds) => join(conds.iter().map(|c| (Logical::And, c)), args),
            Condition::List(items) => {
                let mut op = Logical::Or;
                let mut terms = Vec::new();
                for item in items {
                    match item {
                        Item::Op(next) => op = *next,
                        Item::Cond(c) => terms.push((op, c)),
                    }
                }
                join(terms.into_iter(), args)
            }
            Condition::Cross {
                key,
                expr,
                from,
                cond,
            } => {
                let inner = cond.build(args);
                if inner.is_empty() {
                    format!("{key} IN (SELECT DISTINCT {expr} FROM {from})")
                } else {
                    format!("{key} IN (SELECT DISTINCT {expr} FROM {from} WHERE {inner})")
                }
            }
        }
    }
}

fn bool_sql(b: bool) -> &'static str {
    if b { "TRUE" } else { "FALSE" }
}

/// Join terms, each preceded by its connective; nested groups are
/// parenthesized so they bind as a unit.
fn join<'a>(terms: impl Iterator<Item = (Logical, &'a Condition)>, args: &mut Args) -> String {
    let mut out = String::new();
    for (op, cond) in terms {
        let frag = cond.build(args);
        if frag.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str(match op {
                Logical::And => " AND ",
                Logical::Or => " OR ",
            });
        }
        match cond {
            Condition::All(_) | Condition::List(_) => {
                out.push('(');
                out.push_str(&frag);
                out.push(')');
            }
            _ => out.push_str(&frag),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(c: &Condition) -> (String, Vec<Value>) {
        let mut args = Args::new();
        let sql = c.build(&mut args);
        (sql, args.into_values())
    }

    #[test]
    fn leaf_variants() {
        assert_eq!(build(&Condition::eq("code", 5)).0, "code = ?1");
        assert_eq!(build(&Condition::distinct("a", 1)).0, "a IS DISTINCT FROM ?1");
        assert_eq!(
            build(&Condition::not_distinct("a", 1)).0,
            "a IS NOT DISTINCT FROM ?1"
        );
        assert_eq!(build(&Condition::Null("a")).0, "a IS NULL");
        assert_eq!(build(&Condition::NotNull("a")).0, "a IS NOT NULL");
        assert_eq!(build(&Condition::Is("a", true)).0, "a IS TRUE");
        assert_eq!(build(&Condition::IsNot("a", false)).0, "a IS NOT FALSE");
        let (sql, args) = build(&Condition::like("name", "%man%"));
        assert_eq!(sql, "name LIKE ?1");
        assert_eq!(args, vec![Value::Text("%man%".into())]);
    }

    #[test]
    fn list_defaults_to_or_and_switches_on_marker() {
        let c = Condition::List(vec![
            Item::Cond(Condition::eq("a", 1)),
            Item::Cond(Condition::eq("b", 2)),
            Item::Op(Logical::And),
            Item::Cond(Condition::eq("c", 3)),
        ]);
        assert_eq!(build(&c).0, "a = ?1 OR b = ?2 AND c = ?3");
    }

    #[test]
    fn nested_groups_are_parenthesized() {
        let c = Condition::and(vec![
            Condition::any_id("comic_id", [1, 2]),
            Condition::all(vec![Condition::eq("x", 1), Condition::NotNull("y")]),
        ]);
        let (sql, args) = build(&c);
        assert_eq!(sql, "(comic_id = ?1 OR comic_id = ?2) AND (x = ?3 AND y IS NOT NULL)");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn empty_members_are_skipped() {
        let c = Condition::and(vec![Condition::none(), Condition::eq("a", 1)]);
        assert_eq!(build(&c).0, "a = ?1");
        assert!(Condition::and(vec![Condition::none()]).is_empty());
        assert_eq!(build(&Condition::none()).0, "");
    }

    #[test]
    fn sub_lookup_binds_zero_after_inner_args() {
        let lookup = SubLookup::id("comic", Condition::eq("code", "ABCDEFGH".to_string()));
        let (sql, args) = build(&Condition::all(vec![
            Condition::eq("rid", "r1".to_string()),
            Condition::eq_lookup("comic_id", lookup),
        ]));
        assert_eq!(
            sql,
            "rid = ?1 AND comic_id = (SELECT COALESCE((SELECT id FROM comic WHERE code = ?2), ?3))"
        );
        assert_eq!(args[2], Value::Integer(0));
    }

    #[test]
    fn cross_condition() {
        let c = Condition::cross(
            "id",
            "comic_id",
            "comic_external",
            Condition::eq("website_id", 4),
        );
        assert_eq!(
            build(&c).0,
            "id IN (SELECT DISTINCT comic_id FROM comic_external WHERE website_id = ?1)"
        );
    }
}
