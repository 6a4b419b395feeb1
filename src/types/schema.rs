//! The external schema the compiler resolves table names against
//!
//! The schema is supplied by the caller and read-only during compilation.
//! Name comparisons are case-sensitive at this layer; case-insensitivity
//! lives in the lexer.

use super::data_type::Type;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// The name
    pub name: String,
    /// The type
    pub ty: Type,
}

/// A table definition: an ordered column list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// The columns
    pub columns: Vec<Column>,
}

/// The database schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// The tables
    tables: HashMap<String, Table>,
}

impl Schema {
    /// An empty schema
    pub fn new() -> Self {
        Schema::default()
    }

    /// Add a table definition
    pub fn create_table<N: Into<String>>(
        &mut self,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = (N, Type)>,
    ) {
        let columns = columns
            .into_iter()
            .map(|(name, ty)| Column { name: name.into(), ty })
            .collect();
        self.tables.insert(name.into(), Table { columns });
    }

    /// Look up a table by name
    pub fn lookup_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// The TPC-H schema used by the command line driver and the tests
    pub fn tpch() -> Self {
        let mut schema = Schema::new();
        schema.create_table("part", [
            ("p_partkey", Type::integer()),
            ("p_name", Type::varchar(55)),
            ("p_mfgr", Type::char(25)),
            ("p_brand", Type::char(10)),
            ("p_type", Type::varchar(25)),
            ("p_size", Type::integer()),
            ("p_container", Type::char(10)),
            ("p_retailprice", Type::decimal(12, 2)),
            ("p_comment", Type::varchar(23)),
        ]);
        schema.create_table("region", [
            ("r_regionkey", Type::integer()),
            ("r_name", Type::char(25)),
            ("r_comment", Type::varchar(152)),
        ]);
        schema.create_table("nation", [
            ("n_nationkey", Type::integer()),
            ("n_name", Type::char(25)),
            ("n_regionkey", Type::integer()),
            ("n_comment", Type::varchar(152)),
        ]);
        schema.create_table("supplier", [
            ("s_suppkey", Type::integer()),
            ("s_name", Type::char(25)),
            ("s_address", Type::varchar(40)),
            ("s_nationkey", Type::integer()),
            ("s_phone", Type::char(15)),
            ("s_acctbal", Type::decimal(12, 2)),
            ("s_comment", Type::varchar(101)),
        ]);
        schema.create_table("partsupp", [
            ("ps_partkey", Type::integer()),
            ("ps_suppkey", Type::integer()),
            ("ps_availqty", Type::integer()),
            ("ps_supplycost", Type::decimal(12, 2)),
            ("ps_comment", Type::varchar(199)),
        ]);
        schema.create_table("customer", [
            ("c_custkey", Type::integer()),
            ("c_name", Type::varchar(25)),
            ("c_address", Type::varchar(40)),
            ("c_nationkey", Type::integer()),
            ("c_phone", Type::char(15)),
            ("c_acctbal", Type::decimal(12, 2)),
            ("c_mktsegment", Type::char(10)),
            ("c_comment", Type::varchar(117)),
        ]);
        schema.create_table("orders", [
            ("o_orderkey", Type::integer()),
            ("o_custkey", Type::integer()),
            ("o_orderstatus", Type::char(1)),
            ("o_totalprice", Type::decimal(12, 2)),
            ("o_orderdate", Type::date()),
            ("o_orderpriority", Type::char(15)),
            ("o_clerk", Type::char(15)),
            ("o_shippriority", Type::integer()),
            ("o_comment", Type::varchar(79)),
        ]);
        schema.create_table("lineitem", [
            ("l_orderkey", Type::integer()),
            ("l_partkey", Type::integer()),
            ("l_suppkey", Type::integer()),
            ("l_linenumber", Type::integer()),
            ("l_quantity", Type::decimal(12, 2)),
            ("l_extendedprice", Type::decimal(12, 2)),
            ("l_discount", Type::decimal(12, 2)),
            ("l_tax", Type::decimal(12, 2)),
            ("l_returnflag", Type::char(1)),
            ("l_linestatus", Type::char(1)),
            ("l_shipdate", Type::date()),
            ("l_commitdate", Type::date()),
            ("l_receiptdate", Type::date()),
            ("l_shipinstruct", Type::char(25)),
            ("l_shipmode", Type::char(10)),
            ("l_comment", Type::varchar(44)),
        ]);
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_sensitive() {
        let schema = Schema::tpch();
        assert!(schema.lookup_table("nation").is_some());
        assert!(schema.lookup_table("Nation").is_none());
        assert!(schema.lookup_table("unknown").is_none());
    }

    #[test]
    fn column_order_is_preserved() {
        let schema = Schema::tpch();
        let nation = schema.lookup_table("nation").unwrap();
        let names: Vec<_> = nation.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["n_nationkey", "n_name", "n_regionkey", "n_comment"]);
    }
}
