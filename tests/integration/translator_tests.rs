use relstore::errors::StorageError;
use relstore::executor::ExecutorError;
use relstore::query_model::{ConditionOperator, QConst, QField, QSort, Query, QueryNode};
use relstore::sql_generator::ToSql;
use relstore::translator::TranslationError;
use relstore::{QueryTranslator, StorageConfig};

use super::fixtures::{
    self, MockExecutor, RecordingExecutor, reversible_schema, test_schema,
};

fn translate(query: &Query) -> Result<relstore::sql_generator::SelectStatement, TranslationError> {
    let schema = test_schema();
    let config = StorageConfig::default();
    QueryTranslator::new(&schema, &config).translate(query)
}

#[test]
fn sorting_by_all_direct_properties_joins_each_once_in_request_order() {
    let statement = translate(
        &Query::new("contacts").with_sort(vec![
            QSort::asc("name"),
            QSort::desc("birthday"),
            QSort::asc("is_primary"),
        ]),
    )
    .unwrap();

    assert_eq!(statement.joins.len(), 3);
    assert_eq!(statement.joins[0].table_alias, "objects_string_values_0");
    assert_eq!(statement.joins[1].table_alias, "objects_datetime_values_1");
    assert_eq!(statement.joins[2].table_alias, "objects_boolean_values_2");

    assert_eq!(statement.order_by.len(), 3);
    assert_eq!(statement.order_by[0].expression, "objects_string_values_0.value");
    assert_eq!(statement.order_by[1].expression, "objects_datetime_values_1.value");
    assert_eq!(statement.order_by[2].expression, "objects_boolean_values_2.value");
}

#[test]
fn object_side_sort_succeeds_through_registered_reverse() {
    let schema = reversible_schema();
    let config = StorageConfig::default();
    let translator = QueryTranslator::new(&schema, &config);

    let statement = translator
        .translate(
            &Query::new("companies")
                .with_sort(vec![QSort::asc("contacts_employee_companies.name")]),
        )
        .unwrap();

    // roles swap: the relation rows are matched from their object side
    let relation_join = &statement.joins[0];
    assert!(relation_join
        .joining_on
        .contains(&"object_relations_0.object_id=objects.id".to_string()));
    let value_join = &statement.joins[1];
    assert!(value_join
        .joining_on
        .contains(&"objects_string_values_1.object_id=object_relations_0.subject_id".to_string()));
}

#[test]
fn object_side_sort_fails_without_reverse_registration() {
    let err = translate(
        &Query::new("companies").with_sort(vec![QSort::asc("contacts_employee_companies.name")]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        TranslationError::RelationshipNotReversible {
            relationship_id: "contacts_employee_companies".to_string()
        }
    );
}

#[test]
fn relationship_from_unrelated_class_is_rejected() {
    let err = translate(
        &Query::new("countries").with_sort(vec![QSort::asc("contacts_employee_companies.name")]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        TranslationError::RelationshipNotApplicable {
            relationship_id: "contacts_employee_companies".to_string(),
            class_id: "countries".to_string()
        }
    );
}

#[test]
fn one_to_many_traversal_is_rejected() {
    let err = translate(
        &Query::new("companies").with_sort(vec![QSort::asc("companies_employee_contacts.name")]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        TranslationError::MultiplicityAmbiguity {
            relationship_id: "companies_employee_contacts".to_string()
        }
    );
}

#[test]
fn multivalue_misuse_fails_deterministically() {
    let sort_err = translate(&Query::new("contacts").with_sort(vec![QSort::asc("phone")]))
        .unwrap_err();
    assert_eq!(
        sort_err,
        TranslationError::MultivalueSort {
            property_id: "phone".to_string()
        }
    );

    let filter_err = translate(
        &Query::new("contacts").with_condition(QueryNode::equal("phone", "555-0100")),
    )
    .unwrap_err();
    assert_eq!(
        filter_err,
        TranslationError::MultivalueOperand {
            property_id: "phone".to_string()
        }
    );
}

#[test]
fn derived_filter_matches_externally_wrapped_source_column() {
    // filtering by the derived property ...
    let derived = translate(
        &Query::new("contacts").with_condition(QueryNode::equal("birthday_year", 1999i64)),
    )
    .unwrap();

    // ... lands on the same attribute column as filtering by the source,
    // wrapped with the declared transform
    let source = translate(
        &Query::new("contacts").with_condition(QueryNode::equal("birthday", 1i64)),
    )
    .unwrap();
    assert_eq!(derived.joins, source.joins);
    let source_column = &source.joins[0].table_alias;
    assert_eq!(
        derived.filter.as_deref().unwrap(),
        format!(
            "objects.compact_class_id=1 AND (EXTRACT(YEAR FROM {source_column}.value)=1999)"
        )
    );
}

#[test]
fn template_derivation_wraps_the_identifier_column() {
    let statement = translate(
        &Query::new("contacts")
            .with_condition(QueryNode::equal("id_x10", 40i64))
            .with_fields(vec![QField::new("id_x10")]),
    )
    .unwrap();

    assert_eq!(statement.select[1].expression, "objects.id*10");
    assert_eq!(statement.select[1].alias.as_deref(), Some("id_x10"));
    assert!(statement
        .filter
        .as_deref()
        .unwrap()
        .contains("(objects.id*10=40)"));
    // the identifier pseudo-property needs no attribute join
    assert!(statement.joins.is_empty());
}

#[test]
fn is_null_matches_join_absence() {
    let statement = translate(
        &Query::new("contacts").with_condition(QueryNode::is_null("birthday")),
    )
    .unwrap();
    assert_eq!(statement.joins.len(), 1);
    assert_eq!(statement.joins[0].table_name, "objects_datetime_values");
    assert_eq!(
        statement.filter.as_deref(),
        Some("objects.compact_class_id=1 AND (objects_datetime_values_0.value IS NULL)")
    );
}

#[test]
fn end_to_end_relationship_sort_places_null_join_first() {
    fixtures::init_logging();
    let schema = test_schema();
    let config = StorageConfig::default();
    let translator = QueryTranslator::new(&schema, &config);

    // John -> Google, Bob -> Microsoft, Mary unlinked; ascending company
    // name puts the null join value first
    let executor = RecordingExecutor::returning_ids(vec![4, 3, 5]);
    let sort: QSort = "contacts_employee_companies.name asc".parse().unwrap();
    let ids = translator
        .load_object_ids(
            &executor,
            &Query::new("contacts").with_sort(vec![sort]),
        )
        .unwrap();

    assert_eq!(ids, vec![4, 3, 5]);
    assert_eq!(
        executor.last_sql(),
        "SELECT objects.id\n\
         FROM objects AS objects\n\
         LEFT JOIN object_relations AS object_relations_0 ON \
         (object_relations_0.subject_id=objects.id AND \
         object_relations_0.predicate_class_compact_id=4)\n\
         LEFT JOIN objects_string_values AS objects_string_values_1 ON \
         (objects_string_values_1.object_id=object_relations_0.object_id AND \
         objects_string_values_1.property_compact_id=1)\n\
         WHERE objects.compact_class_id=1\n\
         ORDER BY objects_string_values_1.value ASC\n"
    );
}

#[test]
fn pagination_is_forwarded_to_the_executor() {
    let schema = test_schema();
    let config = StorageConfig::default();
    let translator = QueryTranslator::new(&schema, &config);

    let executor = RecordingExecutor::returning_ids(vec![5]);
    let ids = translator
        .load_object_ids(
            &executor,
            &Query::new("contacts")
                .with_sort(vec![
                    QSort::asc("birthday"),
                    QSort::desc("is_primary"),
                    QSort::desc("name"),
                ])
                .with_page(1, 1),
        )
        .unwrap();

    assert_eq!(ids, vec![5]);
    assert!(executor.last_sql().contains("LIMIT 1, 1"));
}

#[test]
fn multi_hop_path_joins_each_hop_per_reference() {
    let statement = translate(
        &Query::new("contacts")
            .with_fields(vec![
                QField::new("name"),
                QField::from_path("contacts_employee_companies.companies_country_countries.name"),
            ])
            .with_sort(vec![QSort::asc(
                "contacts_employee_companies.companies_country_countries.name",
            )]),
    )
    .unwrap();

    // projection: 1 attribute join + 2 relation hops + 1 attribute join,
    // sort: the same path joined again under fresh aliases
    assert_eq!(statement.joins.len(), 7);
    assert_eq!(
        statement.select[2].alias.as_deref(),
        Some("contacts_employee_companies_companies_country_countries_name")
    );

    let hop1 = &statement.joins[1];
    assert!(hop1
        .joining_on
        .contains(&"object_relations_1.subject_id=objects.id".to_string()));
    assert!(hop1
        .joining_on
        .contains(&"object_relations_1.predicate_class_compact_id=4".to_string()));
    let hop2 = &statement.joins[2];
    assert!(hop2
        .joining_on
        .contains(&"object_relations_2.subject_id=object_relations_1.object_id".to_string()));
    assert!(hop2
        .joining_on
        .contains(&"object_relations_2.predicate_class_compact_id=5".to_string()));

    assert_eq!(statement.order_by[0].expression, "objects_string_values_6.value");
}

#[test]
fn related_derived_property_resolves_through_the_relationship() {
    let statement = translate(&Query::new("contacts").with_condition(QueryNode::equal(
        "contacts_employee_companies.created_year",
        1975i64,
    )))
    .unwrap();

    assert_eq!(statement.joins.len(), 2);
    assert_eq!(statement.joins[1].table_name, "objects_datetime_values");
    assert!(statement
        .filter
        .as_deref()
        .unwrap()
        .contains("EXTRACT(YEAR FROM objects_datetime_values_1.value)=1975"));
}

#[test]
fn filter_by_related_field_joins_and_compares_value_column() {
    let statement = translate(&Query::new("contacts").with_condition(QueryNode::condition(
        QField::from_path("contacts_employee_companies.name"),
        ConditionOperator::Like,
        QConst::new("Go%"),
    )))
    .unwrap();

    assert_eq!(statement.joins.len(), 2);
    assert!(statement
        .filter
        .as_deref()
        .unwrap()
        .contains("objects_string_values_1.value LIKE 'Go%'"));
}

#[test]
fn nested_query_is_inlined_as_a_membership_source() {
    let inner = Query::new("contacts")
        .with_condition(QueryNode::condition(
            QField::new("name"),
            ConditionOperator::Like,
            QConst::new("Jo%"),
        ))
        .with_fields(vec![QField::from_path("contacts_employee_companies.id")]);

    let statement = translate(&Query::new("companies").with_condition(QueryNode::condition(
        QField::new("id"),
        ConditionOperator::In,
        inner,
    )))
    .unwrap();

    let filter = statement.filter.unwrap();
    assert!(filter.starts_with("objects.compact_class_id=2 AND (objects.id IN (SELECT"));
    assert!(filter.contains("SELECT object_relations_0.object_id FROM objects AS objects"));
    assert!(filter.contains("objects_string_values_1.value LIKE 'Jo%'"));
    // the nested statement contributes no joins to the outer one
    assert!(statement.joins.is_empty());
}

#[test]
fn renamed_projection_uses_the_supplied_output_name() {
    let statement = translate(&Query::new("contacts").with_fields(vec![
        QField::new("name"),
        QField::with_expression("company_name", "contacts_employee_companies.name"),
    ]))
    .unwrap();

    assert_eq!(statement.select[1].alias.as_deref(), Some("name"));
    assert_eq!(statement.select[2].alias.as_deref(), Some("company_name"));
    assert_eq!(statement.select[2].expression, "objects_string_values_2.value");
}

#[test]
fn count_query_ignores_sort_and_pagination() {
    let schema = test_schema();
    let config = StorageConfig::default();
    let translator = QueryTranslator::new(&schema, &config);

    let executor = RecordingExecutor::returning_count(2);
    let count = translator
        .get_objects_count(
            &executor,
            &Query::new("contacts")
                .with_condition(QueryNode::equal("is_primary", true))
                .with_sort(vec![QSort::asc("name")])
                .with_page(1, 1),
        )
        .unwrap();

    assert_eq!(count, 2);
    let sql = executor.last_sql();
    assert!(sql.starts_with("SELECT COUNT(DISTINCT objects.id)"));
    assert!(!sql.contains("ORDER BY"));
    assert!(!sql.contains("LIMIT"));
}

#[test]
fn executor_failures_propagate_unchanged() {
    let schema = test_schema();
    let config = StorageConfig::default();
    let translator = QueryTranslator::new(&schema, &config);

    let mut executor = MockExecutor::new();
    executor
        .expect_execute_ids()
        .returning(|_| Err(ExecutorError::Backend("connection lost".to_string())));

    let err = translator
        .load_object_ids(&executor, &Query::new("contacts"))
        .unwrap_err();
    match err {
        StorageError::Executor(ExecutorError::Backend(message)) => {
            assert_eq!(message, "connection lost");
        }
        other => panic!("expected executor error, got {other:?}"),
    }
}

#[test]
fn class_scoped_relationship_lookup_uses_the_bidirectional_index() -> anyhow::Result<()> {
    let schema = test_schema();
    let forward = schema.find_class_relationship("contacts", "employee", "companies", false)?;
    assert_eq!(forward.id, "contacts_employee_companies");
    assert!(
        schema
            .find_class_relationship("companies", "employee", "contacts", true)
            .is_err()
    );

    let reversible = reversible_schema();
    let reverse = reversible.find_class_relationship("companies", "employee", "contacts", true)?;
    assert!(reverse.reversed);
    assert_eq!(reverse.subject_class_id, "companies");
    Ok(())
}

#[test]
fn translated_statement_renders_stable_sql_text() {
    let statement = translate(
        &Query::new("contacts")
            .with_condition(QueryNode::equal("name", "Mary"))
            .with_fields(vec![QField::new("id")]),
    )
    .unwrap();

    let sql = statement.to_sql();
    assert_eq!(
        sql,
        "SELECT objects.id, objects.id AS id\n\
         FROM objects AS objects\n\
         LEFT JOIN objects_string_values AS objects_string_values_0 ON \
         (objects_string_values_0.object_id=objects.id AND \
         objects_string_values_0.property_compact_id=1)\n\
         WHERE objects.compact_class_id=1 AND (objects_string_values_0.value='Mary')\n"
    );
}
