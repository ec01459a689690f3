/*!
Role-based field visibility.

A [`VisibilityTable`] says, for each viewing role, which fields of another
user that viewer may read or write. Fields are grouped into a `basic` bucket
that applies to every target, plus one bucket per target role.
*/
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::roles::Role;

const ADMIN_BASIC: &[&str] = &[
    "firstName",
    "lastName",
    "email",
    "phone",
    "gender",
    "dateOfBirth",
    "address",
    "profileImage",
];
const ADMIN_STUDENT: &[&str] = &[
    "studentId",
    "classId",
    "section",
    "rollNumber",
    "admissionDate",
    "bloodGroup",
    "parentId",
];
const ADMIN_TEACHER: &[&str] = &[
    "employeeId",
    "qualification",
    "experience",
    "subjects",
    "joiningDate",
    "salary",
];
const ADMIN_PARENT: &[&str] = &["occupation", "relationship", "studentIds", "emergencyContact"];

const TEACHER_BASIC: &[&str] = &["firstName", "lastName", "email", "phone", "gender", "profileImage"];
const TEACHER_STUDENT: &[&str] = &["studentId", "classId", "section", "rollNumber", "bloodGroup"];
const TEACHER_TEACHER: &[&str] = &["qualification", "experience", "subjects"];
const TEACHER_PARENT: &[&str] = &["relationship", "emergencyContact"];

const STUDENT_BASIC: &[&str] = &["firstName", "lastName", "email", "profileImage"];
const STUDENT_STUDENT: &[&str] = &["studentId", "classId", "section", "rollNumber"];
const STUDENT_TEACHER: &[&str] = &["subjects", "qualification"];
const STUDENT_PARENT: &[&str] = &[];

const PARENT_BASIC: &[&str] = &["firstName", "lastName", "email", "phone", "profileImage"];
const PARENT_STUDENT: &[&str] = &["studentId", "classId", "section", "rollNumber", "bloodGroup"];
const PARENT_TEACHER: &[&str] = &["subjects"];
const PARENT_PARENT: &[&str] = &["occupation", "relationship", "emergencyContact"];

/// Fields one viewer role may see, bucketed by what they belong to.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSet {
    #[serde(default)]
    pub basic: Vec<String>,
    #[serde(default)]
    pub student: Vec<String>,
    #[serde(default)]
    pub teacher: Vec<String>,
    #[serde(default)]
    pub parent: Vec<String>,
}

impl FieldSet {
    fn from_static(
        basic: &[&str],
        student: &[&str],
        teacher: &[&str],
        parent: &[&str],
    ) -> Self {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            basic: owned(basic),
            student: owned(student),
            teacher: owned(teacher),
            parent: owned(parent),
        }
    }

    /// The role-specific bucket for a target. Admins have none.
    fn bucket_for(&self, target: Role) -> &[String] {
        match target {
            Role::Student => &self.student,
            Role::Teacher => &self.teacher,
            Role::Parent => &self.parent,
            Role::Admin => &[],
        }
    }

    /// Name of the first bucket holding a repeated field, with that field.
    fn first_duplicate(&self) -> Option<(&'static str, &str)> {
        let buckets: [(&'static str, &Vec<String>); 4] = [
            ("basic", &self.basic),
            ("student", &self.student),
            ("teacher", &self.teacher),
            ("parent", &self.parent),
        ];
        for (name, fields) in buckets {
            let mut seen = HashSet::new();
            for f in fields {
                if !seen.insert(f.as_str()) {
                    return Some((name, f.as_str()));
                }
            }
        }
        None
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TableError {
    #[error("field {field:?} appears twice in the {bucket} bucket of {role}")]
    DuplicateField {
        role: Role,
        bucket: &'static str,
        field: String,
    },
}

/// Viewer role to [`FieldSet`]. Built once at start-up and only read after.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityTable {
    entries: BTreeMap<Role, FieldSet>,
}

impl VisibilityTable {
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            Role::Admin,
            FieldSet::from_static(ADMIN_BASIC, ADMIN_STUDENT, ADMIN_TEACHER, ADMIN_PARENT),
        );
        entries.insert(
            Role::Teacher,
            FieldSet::from_static(TEACHER_BASIC, TEACHER_STUDENT, TEACHER_TEACHER, TEACHER_PARENT),
        );
        entries.insert(
            Role::Student,
            FieldSet::from_static(STUDENT_BASIC, STUDENT_STUDENT, STUDENT_TEACHER, STUDENT_PARENT),
        );
        entries.insert(
            Role::Parent,
            FieldSet::from_static(PARENT_BASIC, PARENT_STUDENT, PARENT_TEACHER, PARENT_PARENT),
        );
        Self { entries }
    }

    /// Builds a table from explicit entries. Viewer roles left out get no
    /// visibility at all.
    pub fn from_entries<I>(entries: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (Role, FieldSet)>,
    {
        let entries: BTreeMap<Role, FieldSet> = entries.into_iter().collect();
        for (role, set) in &entries {
            if let Some((bucket, field)) = set.first_duplicate() {
                return Err(TableError::DuplicateField {
                    role: *role,
                    bucket,
                    field: field.to_owned(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, viewer: Role) -> Option<&FieldSet> {
        self.entries.get(&viewer)
    }
}

impl Default for VisibilityTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    pub basic: Vec<String>,
    pub role_specific: Vec<String>,
}

impl FormFields {
    /// `basic` followed by `role_specific`, first occurrence wins.
    pub fn allowed(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.basic
            .iter()
            .chain(self.role_specific.iter())
            .map(String::as_str)
            .filter(|f| seen.insert(*f))
            .collect()
    }
}

pub fn get_form_fields(table: &VisibilityTable, viewer: Role, target: Role) -> FormFields {
    let Some(set) = table.get(viewer) else {
        log::debug!("no visibility entry for viewer {}; nothing visible", viewer);
        return FormFields::default();
    };
    FormFields {
        basic: set.basic.clone(),
        role_specific: set.bucket_for(target).to_vec(),
    }
}

/// Keeps only the fields `viewer` may write on a `target` user. Absent
/// fields and empty strings are left out so optional form fields are not
/// sent blank.
pub fn filter_for_submission(
    record: &Map<String, Value>,
    table: &VisibilityTable,
    viewer: Role,
    target: Role,
) -> Map<String, Value> {
    filter_record(record, &get_form_fields(table, viewer, target))
}

/// Read-side twin of [`filter_for_submission`].
pub fn filter_for_display(
    record: &Map<String, Value>,
    table: &VisibilityTable,
    viewer: Role,
    target: Role,
) -> Map<String, Value> {
    filter_record(record, &get_form_fields(table, viewer, target))
}

fn filter_record(record: &Map<String, Value>, fields: &FormFields) -> Map<String, Value> {
    let mut out = Map::new();
    for field in fields.allowed() {
        match record.get(field) {
            None => {}
            Some(Value::String(s)) if s.is_empty() => {}
            Some(v) => {
                out.insert(field.to_owned(), v.clone());
            }
        }
    }
    out
}
