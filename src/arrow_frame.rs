//! Apache Arrow support
//!
//! Arrow record batches are the DataFrame representation this crate
//! validates. This module maps Arrow types onto the schema vocabulary and
//! back, and reads Arrow IPC files.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::buffer::NullBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema, TimeUnit};
use arrow::ipc::reader::FileReader;
use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::introspect::{ObservedField, ObservedType, TabularData};
use crate::model::{Column, Table};
use crate::types::{ScalarType, TypeDescriptor};

impl TabularData for RecordBatch {
    fn observe(&self) -> Result<Vec<ObservedField>> {
        Ok(self
            .schema_ref()
            .fields()
            .iter()
            .zip(self.columns())
            .map(|(field, array)| observe_array(field.name(), array.as_ref()))
            .collect())
    }
}

/// Batches from one frame; all must share a schema
impl TabularData for [RecordBatch] {
    fn observe(&self) -> Result<Vec<ObservedField>> {
        let (first, rest) = self
            .split_first()
            .ok_or_else(|| SchemaError::Introspection("no record batches".to_string()))?;

        let mut fields = first.observe()?;
        for (i, batch) in rest.iter().enumerate() {
            if batch.schema() != first.schema() {
                return Err(SchemaError::Introspection(format!(
                    "record batch {} has a different schema than batch 0",
                    i + 1
                )));
            }
            for (acc, field) in fields.iter_mut().zip(batch.observe()?) {
                acc.absorb(&field);
            }
        }
        Ok(fields)
    }
}

/// Observe an Arrow array, recursing into list and struct children
pub fn observe_array(name: &str, array: &dyn Array) -> ObservedField {
    observe_masked(name, array, None)
}

/// `parent` is the validity of the enclosing struct rows. A child slot under
/// a null parent row is masked, so its nulls are not counted.
fn observe_masked(name: &str, array: &dyn Array, parent: Option<&NullBuffer>) -> ObservedField {
    let nulls = array.logical_nulls();
    let validity = NullBuffer::union(parent, nulls.as_ref());
    let null_count = validity.as_ref().map_or(0, NullBuffer::null_count)
        - parent.map_or(0, NullBuffer::null_count);

    let data_type = match array.data_type() {
        DataType::Struct(fields) => ObservedType::Struct(
            fields
                .iter()
                .zip(array.as_struct().columns())
                .map(|(field, child)| observe_masked(field.name(), child.as_ref(), validity.as_ref()))
                .collect(),
        ),
        // List values have their own row space
        DataType::List(item) => ObservedType::List(Box::new(observe_array(
            item.name(),
            array.as_list::<i32>().values().as_ref(),
        ))),
        DataType::LargeList(item) => ObservedType::List(Box::new(observe_array(
            item.name(),
            array.as_list::<i64>().values().as_ref(),
        ))),
        DataType::FixedSizeList(item, _) => ObservedType::List(Box::new(observe_array(
            item.name(),
            array.as_fixed_size_list().values().as_ref(),
        ))),
        other => match scalar_of(other) {
            Some(scalar) => ObservedType::Scalar(scalar),
            None => ObservedType::Other(other.to_string()),
        },
    };

    ObservedField {
        name: name.to_string(),
        data_type,
        null_count,
    }
}

fn scalar_of(data_type: &DataType) -> Option<ScalarType> {
    let scalar = match data_type {
        DataType::Boolean => ScalarType::Boolean,
        DataType::Int8 => ScalarType::Int8,
        DataType::Int16 => ScalarType::Int16,
        DataType::Int32 => ScalarType::Int32,
        DataType::Int64 => ScalarType::Int64,
        DataType::UInt8 => ScalarType::UInt8,
        DataType::UInt16 => ScalarType::UInt16,
        DataType::UInt32 => ScalarType::UInt32,
        DataType::UInt64 => ScalarType::UInt64,
        DataType::Float32 => ScalarType::Float32,
        DataType::Float64 => ScalarType::Float64,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ScalarType::String,
        DataType::Date32 | DataType::Date64 => ScalarType::Date,
        DataType::Time32(_) | DataType::Time64(_) => ScalarType::Time,
        DataType::Timestamp(_, _) => ScalarType::Datetime,
        // Dictionary-encoded columns report their value type
        DataType::Dictionary(_, value) => return scalar_of(value),
        _ => return None,
    };
    Some(scalar)
}

impl ScalarType {
    pub fn to_arrow(&self) -> DataType {
        match self {
            ScalarType::Boolean => DataType::Boolean,
            ScalarType::Int8 => DataType::Int8,
            ScalarType::Int16 => DataType::Int16,
            ScalarType::Int32 => DataType::Int32,
            ScalarType::Int64 => DataType::Int64,
            ScalarType::UInt8 => DataType::UInt8,
            ScalarType::UInt16 => DataType::UInt16,
            ScalarType::UInt32 => DataType::UInt32,
            ScalarType::UInt64 => DataType::UInt64,
            ScalarType::Float32 => DataType::Float32,
            ScalarType::Float64 => DataType::Float64,
            ScalarType::String => DataType::Utf8,
            ScalarType::Date => DataType::Date32,
            ScalarType::Time => DataType::Time64(TimeUnit::Microsecond),
            ScalarType::Datetime => DataType::Timestamp(TimeUnit::Microsecond, None),
        }
    }
}

impl TypeDescriptor {
    /// Arrow type a conforming column would have
    pub fn to_arrow(&self) -> DataType {
        match self {
            TypeDescriptor::Scalar(scalar) => scalar.to_arrow(),
            TypeDescriptor::List { element } => {
                let item = element.as_ref().map(|e| e.to_arrow()).unwrap_or(DataType::Null);
                DataType::List(Arc::new(Field::new("item", item, true)))
            }
            TypeDescriptor::Struct { fields } => {
                DataType::Struct(fields.iter().map(Column::to_arrow_field).collect::<Fields>())
            }
        }
    }
}

impl Column {
    pub fn to_arrow_field(&self) -> Field {
        Field::new(self.name.as_str(), self.data_type.to_arrow(), self.nullable)
    }
}

impl Table {
    /// Arrow schema for building record batches that conform to this table
    pub fn to_arrow_schema(&self) -> Schema {
        Schema::new(
            self.columns
                .iter()
                .map(Column::to_arrow_field)
                .collect::<Vec<_>>(),
        )
    }
}

/// Read every record batch from an Arrow IPC file
pub fn read_ipc_file(path: impl AsRef<Path>) -> Result<Vec<RecordBatch>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SchemaError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let reader = FileReader::try_new(file, None)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    debug!("Read {} record batches from {:?}", batches.len(), path);
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{
        ArrayRef, Float32Array, Int64Array, ListBuilder, StringArray, StringBuilder, StructArray,
        TimestampMillisecondArray,
    };
    use arrow::ipc::writer::FileWriter;

    fn tags_array() -> ArrayRef {
        let mut builder = ListBuilder::new(StringBuilder::new());
        builder.values().append_value("office");
        builder.values().append_null();
        builder.append(true);
        builder.append(false);
        Arc::new(builder.finish())
    }

    fn sample_batch() -> RecordBatch {
        let attributes = StructArray::from(vec![(
            Arc::new(Field::new("weight", DataType::Float32, true)),
            Arc::new(Float32Array::from(vec![Some(1.5), None])) as ArrayRef,
        )]);
        RecordBatch::try_from_iter(vec![
            ("id", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef),
            ("tags", tags_array()),
            ("attributes", Arc::new(attributes) as ArrayRef),
            (
                "seen",
                Arc::new(TimestampMillisecondArray::from(vec![Some(0), None])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_observe_record_batch() {
        let observed = sample_batch().observe().unwrap();
        let names: Vec<_> = observed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "tags", "attributes", "seen"]);

        assert_eq!(observed[0].data_type, ObservedType::Scalar(ScalarType::Int64));
        assert_eq!(observed[1].data_type.to_string(), "list<string>");
        assert_eq!(observed[1].null_count, 1);
        match &observed[1].data_type {
            ObservedType::List(item) => assert_eq!(item.null_count, 1),
            other => panic!("Expected list, got {:?}", other),
        }
        assert_eq!(observed[2].child("weight").unwrap().null_count, 1);
        assert_eq!(observed[3].data_type, ObservedType::Scalar(ScalarType::Datetime));
    }

    #[test]
    fn test_struct_children_masked_by_parent_nulls() {
        let parent = NullBuffer::from(vec![true, false, true]);
        let inner_fields = Fields::from(vec![Field::new("length", DataType::Float32, true)]);
        let inner = StructArray::try_new(
            inner_fields.clone(),
            vec![Arc::new(Float32Array::from(vec![Some(1.0), None, None])) as ArrayRef],
            None,
        )
        .unwrap();
        let outer = StructArray::try_new(
            Fields::from(vec![
                Field::new("weight", DataType::Float32, true),
                Field::new("dimensions", DataType::Struct(inner_fields), true),
            ]),
            vec![
                Arc::new(Float32Array::from(vec![Some(1.5), None, Some(2.0)])) as ArrayRef,
                Arc::new(inner) as ArrayRef,
            ],
            Some(parent),
        )
        .unwrap();

        let observed = observe_array("attributes", &outer);
        assert_eq!(observed.null_count, 1);
        assert_eq!(observed.child("weight").unwrap().null_count, 0);

        let dimensions = observed.child("dimensions").unwrap();
        assert_eq!(dimensions.null_count, 0);
        // row 2 is null under a valid parent
        assert_eq!(dimensions.child("length").unwrap().null_count, 1);
    }

    #[test]
    fn test_unmapped_type_is_other() {
        let batch = RecordBatch::try_from_iter(vec![(
            "raw",
            Arc::new(arrow::array::BinaryArray::from(vec![b"ab".as_ref()])) as ArrayRef,
        )])
        .unwrap();
        let observed = batch.observe().unwrap();
        assert_eq!(observed[0].data_type, ObservedType::Other("Binary".to_string()));
    }

    #[test]
    fn test_multiple_batches_sum_nulls() {
        let batches = vec![sample_batch(), sample_batch()];
        let observed = batches.observe().unwrap();
        assert_eq!(observed[1].null_count, 2);
        assert_eq!(observed[2].child("weight").unwrap().null_count, 2);
    }

    #[test]
    fn test_batches_with_different_schemas_fail() {
        let other = RecordBatch::try_from_iter(vec![(
            "name",
            Arc::new(StringArray::from(vec!["a"])) as ArrayRef,
        )])
        .unwrap();
        let err = vec![sample_batch(), other].observe().unwrap_err();
        assert!(matches!(err, SchemaError::Introspection(_)));

        let empty: Vec<RecordBatch> = Vec::new();
        assert!(empty.observe().is_err());
    }

    #[test]
    fn test_table_to_arrow_schema() {
        let table = Table {
            name: "products".to_string(),
            description: None,
            columns: vec![
                Column::new("id", ScalarType::Int64),
                Column::new("tags", TypeDescriptor::list_of(ScalarType::String.into())).nullable(true),
                Column::new(
                    "attributes",
                    TypeDescriptor::Struct {
                        fields: vec![Column::new("weight", ScalarType::Float32)],
                    },
                ),
            ],
        };
        let schema = table.to_arrow_schema();
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert!(!schema.field(0).is_nullable());
        assert!(schema.field(1).is_nullable());
        match schema.field(2).data_type() {
            DataType::Struct(fields) => {
                assert_eq!(fields[0].name(), "weight");
                assert_eq!(fields[0].data_type(), &DataType::Float32);
            }
            other => panic!("Expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_read_ipc_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.arrow");
        let batch = sample_batch();

        let file = File::create(&path).unwrap();
        let mut writer = FileWriter::try_new(file, batch.schema_ref()).unwrap();
        writer.write(&batch).unwrap();
        writer.write(&batch).unwrap();
        writer.finish().unwrap();

        let batches = read_ipc_file(&path).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].num_rows(), 2);

        let missing = read_ipc_file(dir.path().join("missing.arrow")).unwrap_err();
        assert!(matches!(missing, SchemaError::FileRead { .. }));
    }
}
