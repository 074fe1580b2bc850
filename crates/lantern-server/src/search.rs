//! Query-parameter search filters.
//!
//! Index and the conditional operations accept parameters of the form
//! `<field>:<modifier>=<value>` (e.g. `patient:Patient=123`). A parameter is
//! only honored when its field is one of the resource's recognized reference
//! parameters; everything else is ignored and the scan stays unfiltered.
//! A reference field resolves to equality on `<field>.referenceid`.

use lantern_storage::Filter;

use crate::registry::ResourceSpec;

pub fn filter_from_query(spec: &ResourceSpec, query: Option<&str>) -> Filter {
    let mut filter = Filter::empty();
    let Some(query) = query else {
        return filter;
    };

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let Some((field, _modifier)) = key.split_once(':') else {
            continue;
        };
        if spec.reference_params.contains(&field) {
            filter = filter.with_clause(format!("{field}.referenceid"), value.to_string());
        }
    }
    filter
}
