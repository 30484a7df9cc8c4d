/// Course, assignment, and submission storage for the course-management
/// exercise. Membership lives in the enrollments link table; roles live in
/// the course_roles side table keyed by (user_id, course_id).
///
/// Cascades are explicit: deleting a course removes its assignments, their
/// submissions, its enrollments, and its role rows in one SQL transaction.
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

use super::models::{Assignment, Course, CourseDetail, Role, Student, StudentDetail, Submission};
use super::{DbPool, Store, StoreError, StoreResult};

fn course_from_row(row: &Row) -> SqliteResult<Course> {
    Ok(Course {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
    })
}

fn student_from_row(row: &Row) -> SqliteResult<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        netid: row.get(2)?,
    })
}

fn assignment_from_row(row: &Row) -> SqliteResult<Assignment> {
    Ok(Assignment {
        id: row.get(0)?,
        title: row.get(1)?,
        due_date: row.get(2)?,
    })
}

fn get_student_on(conn: &Connection, id: i64) -> SqliteResult<Option<Student>> {
    conn.query_row(
        "SELECT id, name, netid FROM students WHERE id = ?1",
        params![id],
        student_from_row,
    )
    .optional()
}

fn course_exists(conn: &Connection, id: i64) -> SqliteResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM courses WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

/// Full serialized view of a course: assignments plus members partitioned
/// into instructors and students by their role row. Members whose role row
/// is missing or unrecognized appear in neither list.
fn course_detail_on(conn: &Connection, id: i64) -> SqliteResult<Option<CourseDetail>> {
    let course = conn
        .query_row(
            "SELECT id, code, name FROM courses WHERE id = ?1",
            params![id],
            course_from_row,
        )
        .optional()?;
    let Some(course) = course else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT id, title, due_date FROM assignments WHERE course_id = ?1 ORDER BY id",
    )?;
    let assignments = stmt
        .query_map(params![id], assignment_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT s.id, s.name, s.netid, r.role
         FROM enrollments e
         JOIN students s ON s.id = e.user_id
         LEFT JOIN course_roles r ON r.user_id = e.user_id AND r.course_id = e.course_id
         WHERE e.course_id = ?1
         ORDER BY s.id",
    )?;
    let members = stmt
        .query_map(params![id], |row| {
            let student = student_from_row(row)?;
            let role: Option<String> = row.get(3)?;
            Ok((student, role))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut instructors = Vec::new();
    let mut students = Vec::new();
    for (student, role) in members {
        match role.as_deref().and_then(Role::from_str) {
            Some(Role::Instructor) => instructors.push(student),
            Some(Role::Student) => students.push(student),
            None => {}
        }
    }

    Ok(Some(CourseDetail {
        id: course.id,
        code: course.code,
        name: course.name,
        assignments,
        instructors,
        students,
    }))
}

impl Store {
    pub async fn create_course(pool: &DbPool, code: &str, name: &str) -> SqliteResult<CourseDetail> {
        let conn = pool.lock().await;

        conn.execute(
            "INSERT INTO courses (code, name) VALUES (?1, ?2)",
            params![code, name],
        )?;
        let id = conn.last_insert_rowid();

        let course = conn.query_row(
            "SELECT id, code, name FROM courses WHERE id = ?1",
            params![id],
            course_from_row,
        )?;

        // A fresh course has no assignments or members yet.
        Ok(CourseDetail {
            id: course.id,
            code: course.code,
            name: course.name,
            assignments: Vec::new(),
            instructors: Vec::new(),
            students: Vec::new(),
        })
    }

    pub async fn all_courses(pool: &DbPool) -> SqliteResult<Vec<CourseDetail>> {
        let conn = pool.lock().await;

        let ids: Vec<i64> = conn
            .prepare("SELECT id FROM courses ORDER BY id")?
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut courses = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(detail) = course_detail_on(&conn, id)? {
                courses.push(detail);
            }
        }

        Ok(courses)
    }

    pub async fn get_course(pool: &DbPool, id: i64) -> SqliteResult<Option<CourseDetail>> {
        let conn = pool.lock().await;
        course_detail_on(&conn, id)
    }

    /// Delete a course and cascade: submissions of its assignments, the
    /// assignments, enrollments, and role rows all go with it. Returns the
    /// serialized course as it was before deletion.
    pub async fn delete_course(pool: &DbPool, id: i64) -> SqliteResult<Option<CourseDetail>> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        let Some(detail) = course_detail_on(&tx, id)? else {
            return Ok(None);
        };

        tx.execute(
            "DELETE FROM submissions WHERE assignment_id IN
             (SELECT id FROM assignments WHERE course_id = ?1)",
            params![id],
        )?;
        tx.execute("DELETE FROM assignments WHERE course_id = ?1", params![id])?;
        tx.execute("DELETE FROM enrollments WHERE course_id = ?1", params![id])?;
        tx.execute("DELETE FROM course_roles WHERE course_id = ?1", params![id])?;
        tx.execute("DELETE FROM courses WHERE id = ?1", params![id])?;
        tx.commit()?;

        Ok(Some(detail))
    }

    pub async fn create_student(pool: &DbPool, name: &str, netid: &str) -> SqliteResult<Student> {
        let conn = pool.lock().await;

        conn.execute(
            "INSERT INTO students (name, netid) VALUES (?1, ?2)",
            params![name, netid],
        )?;
        let id = conn.last_insert_rowid();

        conn.query_row(
            "SELECT id, name, netid FROM students WHERE id = ?1",
            params![id],
            student_from_row,
        )
    }

    /// Student with every course they are enrolled in, fully serialized.
    pub async fn get_student(pool: &DbPool, id: i64) -> SqliteResult<Option<StudentDetail>> {
        let conn = pool.lock().await;

        let Some(student) = get_student_on(&conn, id)? else {
            return Ok(None);
        };

        let course_ids: Vec<i64> = conn
            .prepare("SELECT course_id FROM enrollments WHERE user_id = ?1 ORDER BY course_id")?
            .query_map(params![id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut courses = Vec::with_capacity(course_ids.len());
        for course_id in course_ids {
            if let Some(detail) = course_detail_on(&conn, course_id)? {
                courses.push(detail);
            }
        }

        Ok(Some(StudentDetail {
            id: student.id,
            name: student.name,
            netid: student.netid,
            courses,
        }))
    }

    /// Add a user to a course with a role, returning the updated course.
    pub async fn enroll(
        pool: &DbPool,
        course_id: i64,
        user_id: i64,
        role: Role,
    ) -> StoreResult<CourseDetail> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        if !course_exists(&tx, course_id)? {
            return Err(StoreError::NotFound("Course"));
        }
        if get_student_on(&tx, user_id)?.is_none() {
            return Err(StoreError::NotFound("User"));
        }

        tx.execute(
            "INSERT INTO enrollments (course_id, user_id) VALUES (?1, ?2)",
            params![course_id, user_id],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO course_roles (user_id, course_id, role) VALUES (?1, ?2, ?3)",
            params![user_id, course_id, role.as_str()],
        )?;

        let detail =
            course_detail_on(&tx, course_id)?.ok_or(StoreError::NotFound("Course"))?;
        tx.commit()?;

        Ok(detail)
    }

    /// Remove a user from a course. The role row is cleaned up with the
    /// enrollment. Returns the dropped student.
    pub async fn drop_student(
        pool: &DbPool,
        course_id: i64,
        user_id: i64,
    ) -> StoreResult<Student> {
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        if !course_exists(&tx, course_id)? {
            return Err(StoreError::NotFound("Course"));
        }
        let student = get_student_on(&tx, user_id)?.ok_or(StoreError::NotFound("User"))?;

        tx.execute(
            "DELETE FROM enrollments WHERE course_id = ?1 AND user_id = ?2",
            params![course_id, user_id],
        )?;
        tx.execute(
            "DELETE FROM course_roles WHERE course_id = ?1 AND user_id = ?2",
            params![course_id, user_id],
        )?;
        tx.commit()?;

        Ok(student)
    }

    /// Create an assignment under an existing course.
    pub async fn create_assignment(
        pool: &DbPool,
        course_id: i64,
        title: &str,
        due_date: i64,
    ) -> StoreResult<Assignment> {
        let conn = pool.lock().await;

        if !course_exists(&conn, course_id)? {
            return Err(StoreError::NotFound("Course"));
        }

        conn.execute(
            "INSERT INTO assignments (title, due_date, course_id) VALUES (?1, ?2, ?3)",
            params![title, due_date, course_id],
        )?;
        let id = conn.last_insert_rowid();

        let assignment = conn.query_row(
            "SELECT id, title, due_date FROM assignments WHERE id = ?1",
            params![id],
            assignment_from_row,
        )?;

        Ok(assignment)
    }

    pub async fn get_assignment(pool: &DbPool, id: i64) -> SqliteResult<Option<Assignment>> {
        let conn = pool.lock().await;

        conn.query_row(
            "SELECT id, title, due_date FROM assignments WHERE id = ?1",
            params![id],
            assignment_from_row,
        )
        .optional()
    }

    /// Partial update of title and/or due_date.
    pub async fn update_assignment(
        pool: &DbPool,
        id: i64,
        title: Option<&str>,
        due_date: Option<i64>,
    ) -> SqliteResult<Option<Assignment>> {
        let conn = pool.lock().await;

        let existing = conn
            .query_row(
                "SELECT id, title, due_date FROM assignments WHERE id = ?1",
                params![id],
                assignment_from_row,
            )
            .optional()?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let title = title.unwrap_or(&existing.title);
        let due_date = due_date.unwrap_or(existing.due_date);
        conn.execute(
            "UPDATE assignments SET title = ?1, due_date = ?2 WHERE id = ?3",
            params![title, due_date, id],
        )?;

        conn.query_row(
            "SELECT id, title, due_date FROM assignments WHERE id = ?1",
            params![id],
            assignment_from_row,
        )
        .optional()
    }

    /// Create a submission under an existing assignment. Score starts unset.
    pub async fn create_submission(
        pool: &DbPool,
        assignment_id: i64,
        user_id: i64,
        content: &str,
    ) -> StoreResult<Submission> {
        let conn = pool.lock().await;

        let assignment: Option<i64> = conn
            .query_row(
                "SELECT id FROM assignments WHERE id = ?1",
                params![assignment_id],
                |row| row.get(0),
            )
            .optional()?;
        if assignment.is_none() {
            return Err(StoreError::NotFound("Assignment"));
        }

        conn.execute(
            "INSERT INTO submissions (user_id, content, assignment_id) VALUES (?1, ?2, ?3)",
            params![user_id, content, assignment_id],
        )?;
        let id = conn.last_insert_rowid();

        let submission = conn.query_row(
            "SELECT id, user_id, content, score FROM submissions WHERE id = ?1",
            params![id],
            |row| {
                Ok(Submission {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    content: row.get(2)?,
                    score: row.get(3)?,
                })
            },
        )?;

        Ok(submission)
    }

    pub async fn get_submission(pool: &DbPool, id: i64) -> SqliteResult<Option<Submission>> {
        let conn = pool.lock().await;

        conn.query_row(
            "SELECT id, user_id, content, score FROM submissions WHERE id = ?1",
            params![id],
            |row| {
                Ok(Submission {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    content: row.get(2)?,
                    score: row.get(3)?,
                })
            },
        )
        .optional()
    }

    /// Set a submission's score. Both the assignment and the submission must
    /// exist. The grade endpoint responds with the assignment, so this
    /// returns it.
    pub async fn grade_submission(
        pool: &DbPool,
        assignment_id: i64,
        submission_id: i64,
        score: i64,
    ) -> StoreResult<Assignment> {
        let conn = pool.lock().await;

        let assignment = conn
            .query_row(
                "SELECT id, title, due_date FROM assignments WHERE id = ?1",
                params![assignment_id],
                assignment_from_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound("Assignment"))?;

        let changed = conn.execute(
            "UPDATE submissions SET score = ?1 WHERE id = ?2",
            params![score, submission_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("Submission"));
        }

        Ok(assignment)
    }
}
