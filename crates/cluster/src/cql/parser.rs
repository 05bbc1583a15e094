use crate::cql::{
    ast::{
        Assignment, Batch, BatchKind, ColumnDef, CreateTable, Delete, Insert, Literal, Operation,
        ParsedStatement, RelOp, Relation, Select, Selection, Statement, TableName, Update,
    },
    lexer::{Spanned, Token, tokenize},
};
use driver::error::QueryError;
use model::core::data_type::CqlType;

/// Parses one CQL statement. A trailing `;` is allowed.
pub fn parse(cql: &str) -> Result<ParsedStatement, QueryError> {
    let mut parser = CqlParser::new(tokenize(cql)?);
    let statement = parser.statement()?;
    parser.eat_punct(";");
    if let Some(extra) = parser.peek() {
        return Err(parser.error_at(extra, "unexpected input after statement"));
    }

    Ok(ParsedStatement {
        statement,
        markers: parser.markers,
    })
}

struct CqlParser {
    tokens: Vec<Spanned>,
    pos: usize,
    markers: usize,
}

impl CqlParser {
    fn new(tokens: Vec<Spanned>) -> Self {
        CqlParser {
            tokens,
            pos: 0,
            markers: 0,
        }
    }

    fn statement(&mut self) -> Result<Statement, QueryError> {
        let keyword = self.keyword()?;
        match keyword.as_str() {
            "select" => self.select().map(Statement::Select),
            "insert" => self.insert().map(Statement::Insert),
            "update" => self.update().map(Statement::Update),
            "delete" => self.delete().map(Statement::Delete),
            "use" => self.identifier().map(Statement::Use),
            "truncate" => {
                self.eat_keyword("table");
                self.table_name().map(Statement::Truncate)
            }
            "begin" => self.batch().map(Statement::Batch),
            "create" => self.create(),
            "drop" => self.drop(),
            other => Err(QueryError::Syntax(format!("unsupported statement: {other}"))),
        }
    }

    fn create(&mut self) -> Result<Statement, QueryError> {
        let keyword = self.keyword()?;
        match keyword.as_str() {
            "keyspace" | "schema" => self.create_keyspace(),
            "table" | "columnfamily" => self.create_table().map(Statement::CreateTable),
            "index" => self.create_index(),
            other => Err(QueryError::Syntax(format!("cannot create {other}"))),
        }
    }

    fn drop(&mut self) -> Result<Statement, QueryError> {
        let keyword = self.keyword()?;
        let if_exists = self.if_exists()?;
        match keyword.as_str() {
            "keyspace" | "schema" => Ok(Statement::DropKeyspace {
                name: self.identifier()?,
                if_exists,
            }),
            "table" | "columnfamily" => Ok(Statement::DropTable {
                table: self.table_name()?,
                if_exists,
            }),
            other => Err(QueryError::Syntax(format!("cannot drop {other}"))),
        }
    }

    fn create_keyspace(&mut self) -> Result<Statement, QueryError> {
        let if_not_exists = self.if_not_exists()?;
        let name = self.identifier()?;
        let mut replication_factor = 1;

        if self.eat_keyword("with") {
            loop {
                let option = self.identifier()?;
                self.expect_punct("=")?;
                if option == "replication" {
                    replication_factor = self.replication()?;
                } else {
                    self.option_value()?;
                }
                if !self.eat_keyword("and") {
                    break;
                }
            }
        }

        Ok(Statement::CreateKeyspace {
            name,
            if_not_exists,
            replication_factor,
        })
    }

    /// `{ 'class': '...', 'replication_factor': n }`, or per data center
    /// factors for topology-aware strategies, which are summed.
    fn replication(&mut self) -> Result<usize, QueryError> {
        self.expect_punct("{")?;
        let mut explicit = None;
        let mut per_dc = 0;

        loop {
            let key = self.string()?;
            self.expect_punct(":")?;
            let value = match self.next_token() {
                Some(Token::Str(s)) | Some(Token::Number(s)) => s,
                _ => return Err(self.error("expected replication option value")),
            };

            if key != "class" {
                let factor = value.parse::<usize>().map_err(|_| {
                    QueryError::Syntax(format!("invalid replication factor: {value}"))
                })?;
                if key == "replication_factor" {
                    explicit = Some(factor);
                } else {
                    per_dc += factor;
                }
            }

            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("}")?;

        Ok(explicit.unwrap_or(per_dc).max(1))
    }

    fn option_value(&mut self) -> Result<(), QueryError> {
        if self.eat_punct("{") {
            while !self.eat_punct("}") {
                if self.next_token().is_none() {
                    return Err(self.error("unterminated option map"));
                }
            }
            return Ok(());
        }
        match self.next_token() {
            Some(_) => Ok(()),
            None => Err(self.error("expected option value")),
        }
    }

    fn create_table(&mut self) -> Result<CreateTable, QueryError> {
        let if_not_exists = self.if_not_exists()?;
        let table = self.table_name()?;
        let mut columns = Vec::new();
        let mut partition_key = Vec::new();
        let mut clustering_key = Vec::new();

        self.expect_punct("(")?;
        loop {
            if self.eat_punct(")") {
                break;
            }

            if self.eat_keyword("primary") {
                self.expect_keyword("key")?;
                self.expect_punct("(")?;
                if self.eat_punct("(") {
                    partition_key = self.identifier_list()?;
                    self.expect_punct(")")?;
                } else {
                    partition_key = vec![self.identifier()?];
                }
                while self.eat_punct(",") {
                    clustering_key.push(self.identifier()?);
                }
                self.expect_punct(")")?;
            } else {
                let name = self.identifier()?;
                let data_type = self.data_type()?;
                if self.eat_keyword("primary") {
                    self.expect_keyword("key")?;
                    partition_key = vec![name.clone()];
                }
                columns.push(ColumnDef { name, data_type });
            }

            // A trailing comma before the closing parenthesis is accepted.
            if !self.eat_punct(",") {
                self.expect_punct(")")?;
                break;
            }
        }

        if self.eat_keyword("with") {
            self.skip_to_end();
        }

        if partition_key.is_empty() {
            return Err(QueryError::InvalidQuery(
                "No PRIMARY KEY specified (exactly one required)".to_string(),
            ));
        }

        Ok(CreateTable {
            table,
            if_not_exists,
            columns,
            partition_key,
            clustering_key,
        })
    }

    fn create_index(&mut self) -> Result<Statement, QueryError> {
        let if_not_exists = self.if_not_exists()?;
        let name = if self.peek_keyword("on") {
            None
        } else {
            Some(self.identifier()?)
        };
        self.expect_keyword("on")?;
        let table = self.table_name()?;
        self.expect_punct("(")?;
        let column = self.identifier()?;
        self.expect_punct(")")?;

        Ok(Statement::CreateIndex {
            name,
            table,
            column,
            if_not_exists,
        })
    }

    fn insert(&mut self) -> Result<Insert, QueryError> {
        self.expect_keyword("into")?;
        let table = self.table_name()?;
        self.expect_punct("(")?;
        let columns = self.identifier_list()?;
        self.expect_punct(")")?;
        self.expect_keyword("values")?;
        self.expect_punct("(")?;
        let mut values = vec![self.literal()?];
        while self.eat_punct(",") {
            values.push(self.literal()?);
        }
        self.expect_punct(")")?;
        let if_not_exists = self.if_not_exists()?;

        Ok(Insert {
            table,
            columns,
            values,
            if_not_exists,
        })
    }

    fn update(&mut self) -> Result<Update, QueryError> {
        let table = self.table_name()?;
        self.expect_keyword("set")?;
        let mut assignments = vec![self.assignment()?];
        while self.eat_punct(",") {
            assignments.push(self.assignment()?);
        }
        let relations = self.where_clause()?;

        Ok(Update {
            table,
            assignments,
            relations,
        })
    }

    fn assignment(&mut self) -> Result<Assignment, QueryError> {
        let column = self.identifier()?;
        self.expect_punct("=")?;

        let self_reference = match (self.peek(), self.tokens.get(self.pos + 1)) {
            (Some(Token::Ident(name)), Some(next)) | (Some(Token::QuotedIdent(name)), Some(next)) => {
                *name == column && matches!(next.token, Token::Punct("+") | Token::Punct("-"))
            }
            _ => false,
        };

        let operation = if self_reference {
            self.pos += 1;
            if self.eat_punct("+") {
                Operation::Add(self.literal()?)
            } else {
                self.expect_punct("-")?;
                Operation::Subtract(self.literal()?)
            }
        } else {
            Operation::Set(self.literal()?)
        };

        Ok(Assignment { column, operation })
    }

    fn delete(&mut self) -> Result<Delete, QueryError> {
        self.expect_keyword("from")?;
        let table = self.table_name()?;
        let relations = self.where_clause()?;
        Ok(Delete { table, relations })
    }

    fn select(&mut self) -> Result<Select, QueryError> {
        let selection = if self.eat_punct("*") {
            Selection::All
        } else if self.peek_keyword("count")
            && matches!(self.tokens.get(self.pos + 1), Some(s) if s.token == Token::Punct("("))
        {
            self.pos += 2;
            if !self.eat_punct("*") {
                self.identifier()?;
            }
            self.expect_punct(")")?;
            Selection::Count
        } else {
            Selection::Columns(self.identifier_list()?)
        };

        self.expect_keyword("from")?;
        let table = self.table_name()?;
        let relations = self.where_clause()?;

        let limit = if self.eat_keyword("limit") {
            match self.next_token() {
                Some(Token::Number(n)) => Some(n.parse::<usize>().map_err(|_| {
                    QueryError::InvalidQuery(format!("invalid LIMIT value: {n}"))
                })?),
                _ => return Err(self.error("expected a number after LIMIT")),
            }
        } else {
            None
        };

        let allow_filtering = if self.eat_keyword("allow") {
            self.expect_keyword("filtering")?;
            true
        } else {
            false
        };

        Ok(Select {
            table,
            selection,
            relations,
            limit,
            allow_filtering,
        })
    }

    fn batch(&mut self) -> Result<Batch, QueryError> {
        let kind = if self.eat_keyword("unlogged") {
            BatchKind::Unlogged
        } else if self.eat_keyword("counter") {
            BatchKind::Counter
        } else {
            self.eat_keyword("logged");
            BatchKind::Logged
        };
        self.expect_keyword("batch")?;

        let mut statements = Vec::new();
        loop {
            if self.eat_keyword("apply") {
                self.expect_keyword("batch")?;
                break;
            }
            let statement = match self.keyword()?.as_str() {
                "insert" => Statement::Insert(self.insert()?),
                "update" => Statement::Update(self.update()?),
                "delete" => Statement::Delete(self.delete()?),
                other => {
                    return Err(QueryError::Syntax(format!(
                        "{other} statements are not allowed in a batch"
                    )));
                }
            };
            statements.push(statement);
            self.eat_punct(";");
        }

        Ok(Batch { kind, statements })
    }

    fn where_clause(&mut self) -> Result<Vec<Relation>, QueryError> {
        let mut relations = Vec::new();
        if !self.eat_keyword("where") {
            return Ok(relations);
        }

        loop {
            let column = self.identifier()?;
            let op = match self.next_token() {
                Some(Token::Punct("=")) => RelOp::Eq,
                Some(Token::Punct("<")) => RelOp::Lt,
                Some(Token::Punct("<=")) => RelOp::Lte,
                Some(Token::Punct(">")) => RelOp::Gt,
                Some(Token::Punct(">=")) => RelOp::Gte,
                _ => return Err(self.error("expected a comparison operator")),
            };
            let value = self.literal()?;
            relations.push(Relation { column, op, value });

            if !self.eat_keyword("and") {
                break;
            }
        }
        Ok(relations)
    }

    fn literal(&mut self) -> Result<Literal, QueryError> {
        let sign = if self.eat_punct("-") {
            "-"
        } else {
            self.eat_punct("+");
            ""
        };

        let literal = match self.next_token() {
            Some(Token::Number(n)) => Literal::Number(format!("{sign}{n}")),
            Some(Token::Ident(word)) if word == "nan" && sign.is_empty() => {
                Literal::Number("NaN".to_string())
            }
            Some(Token::Ident(word)) if word == "infinity" => {
                Literal::Number(format!("{sign}Infinity"))
            }
            Some(token) if !sign.is_empty() => {
                return Err(QueryError::Syntax(format!("cannot negate {token:?}")));
            }
            Some(Token::Ident(word)) if word == "true" => Literal::Bool(true),
            Some(Token::Ident(word)) if word == "false" => Literal::Bool(false),
            Some(Token::Ident(word)) if word == "null" => Literal::Null,
            Some(Token::Str(s)) => Literal::Str(s),
            Some(Token::Blob(b)) => Literal::Blob(b),
            Some(Token::Uuid(u)) => Literal::Uuid(u),
            Some(Token::Marker) => {
                self.markers += 1;
                Literal::Marker(self.markers - 1)
            }
            _ => return Err(self.error("expected a literal")),
        };
        Ok(literal)
    }

    fn data_type(&mut self) -> Result<CqlType, QueryError> {
        let name = self.identifier()?;
        if self.peek_punct("<") {
            return Err(QueryError::InvalidQuery(format!(
                "collection type {name} is not supported"
            )));
        }
        CqlType::from_cql_name(&name).map_err(QueryError::InvalidQuery)
    }

    fn table_name(&mut self) -> Result<TableName, QueryError> {
        let first = self.identifier()?;
        if self.eat_punct(".") {
            Ok(TableName {
                keyspace: Some(first),
                name: self.identifier()?,
            })
        } else {
            Ok(TableName {
                keyspace: None,
                name: first,
            })
        }
    }

    fn identifier_list(&mut self) -> Result<Vec<String>, QueryError> {
        let mut names = vec![self.identifier()?];
        while self.eat_punct(",") {
            names.push(self.identifier()?);
        }
        Ok(names)
    }

    fn identifier(&mut self) -> Result<String, QueryError> {
        match self.next_token() {
            Some(Token::Ident(name)) | Some(Token::QuotedIdent(name)) => Ok(name),
            _ => Err(self.error("expected an identifier")),
        }
    }

    fn string(&mut self) -> Result<String, QueryError> {
        match self.next_token() {
            Some(Token::Str(s)) => Ok(s),
            _ => Err(self.error("expected a string literal")),
        }
    }

    fn keyword(&mut self) -> Result<String, QueryError> {
        match self.next_token() {
            Some(Token::Ident(word)) => Ok(word),
            _ => Err(self.error("expected a keyword")),
        }
    }

    fn if_not_exists(&mut self) -> Result<bool, QueryError> {
        if self.eat_keyword("if") {
            self.expect_keyword("not")?;
            self.expect_keyword("exists")?;
            return Ok(true);
        }
        Ok(false)
    }

    fn if_exists(&mut self) -> Result<bool, QueryError> {
        if self.eat_keyword("if") {
            self.expect_keyword("exists")?;
            return Ok(true);
        }
        Ok(false)
    }

    fn skip_to_end(&mut self) {
        while let Some(token) = self.peek() {
            if *token == Token::Punct(";") {
                break;
            }
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(word)) if word == keyword)
    }

    fn peek_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(Token::Punct(p)) if *p == punct)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let found = self.peek_keyword(keyword);
        if found {
            self.pos += 1;
        }
        found
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        let found = self.peek_punct(punct);
        if found {
            self.pos += 1;
        }
        found
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), QueryError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", keyword.to_ascii_uppercase())))
        }
    }

    fn expect_punct(&mut self, punct: &str) -> Result<(), QueryError> {
        if self.eat_punct(punct) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{punct}'")))
        }
    }

    /// Error pointing at the token before the cursor, or at the end of input.
    fn error(&self, message: &str) -> QueryError {
        match self.tokens.get(self.pos.saturating_sub(1)) {
            Some(spanned) => QueryError::Syntax(format!("{message} at position {}", spanned.pos)),
            None => QueryError::Syntax(format!("{message} at end of input")),
        }
    }

    fn error_at(&self, token: &Token, message: &str) -> QueryError {
        QueryError::Syntax(format!("{message}: {token:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(cql: &str) -> Statement {
        parse(cql).unwrap().statement
    }

    #[test]
    fn test_create_table_with_trailing_comma() {
        let Statement::CreateTable(table) = statement(
            "CREATE TABLE table1(
                id uuid PRIMARY KEY,
                label text,
            );",
        ) else {
            panic!("expected CREATE TABLE");
        };

        assert_eq!(table.table.name, "table1");
        assert_eq!(table.partition_key, vec!["id"]);
        assert_eq!(table.columns[1].data_type, CqlType::Text);
    }

    #[test]
    fn test_create_table_with_composite_key() {
        let Statement::CreateTable(table) = statement(
            "CREATE TABLE IF NOT EXISTS ks.events (day text, bucket int, ts timestamp, v varchar, \
             PRIMARY KEY ((day, bucket), ts)) WITH CLUSTERING ORDER BY (ts DESC)",
        ) else {
            panic!("expected CREATE TABLE");
        };

        assert!(table.if_not_exists);
        assert_eq!(table.table.keyspace.as_deref(), Some("ks"));
        assert_eq!(table.partition_key, vec!["day", "bucket"]);
        assert_eq!(table.clustering_key, vec!["ts"]);
        assert_eq!(table.columns[3].data_type, CqlType::Text);
    }

    #[test]
    fn test_create_keyspace() {
        let parsed = statement(
            "CREATE KEYSPACE tester WITH replication = {'class': 'SimpleStrategy', \
             'replication_factor': 3} AND durable_writes = true",
        );
        assert_eq!(
            parsed,
            Statement::CreateKeyspace {
                name: "tester".into(),
                if_not_exists: false,
                replication_factor: 3,
            }
        );
    }

    #[test]
    fn test_counter_update() {
        let Statement::Update(update) =
            statement("UPDATE t SET incdec = incdec -0  WHERE tweet_id = 5;")
        else {
            panic!("expected UPDATE");
        };
        assert_eq!(
            update.assignments[0].operation,
            Operation::Subtract(Literal::Number("0".into()))
        );

        let Statement::Update(update) = statement("UPDATE t SET incdec = incdec +7 WHERE k = 1")
        else {
            panic!("expected UPDATE");
        };
        assert_eq!(
            update.assignments[0].operation,
            Operation::Add(Literal::Number("7".into()))
        );
    }

    #[test]
    fn test_markers_are_numbered() {
        let parsed = parse("INSERT INTO t (id, label, number) VALUES (?, ?, ?)").unwrap();
        assert_eq!(parsed.markers, 3);
        let Statement::Insert(insert) = parsed.statement else {
            panic!("expected INSERT");
        };
        assert_eq!(insert.values[2], Literal::Marker(2));
    }

    #[test]
    fn test_select_clauses() {
        let Statement::Select(select) =
            statement("SELECT name, surname from users WHERE name = 'Adam' AND age >= 3 LIMIT 10 ALLOW FILTERING")
        else {
            panic!("expected SELECT");
        };
        assert_eq!(select.selection, Selection::Columns(vec!["name".into(), "surname".into()]));
        assert_eq!(select.relations.len(), 2);
        assert_eq!(select.relations[1].op, RelOp::Gte);
        assert_eq!(select.limit, Some(10));
        assert!(select.allow_filtering);

        let Statement::Select(select) = statement("SELECT COUNT(*) FROM users") else {
            panic!("expected SELECT");
        };
        assert_eq!(select.selection, Selection::Count);
    }

    #[test]
    fn test_special_float_literals() {
        let Statement::Insert(insert) =
            statement("INSERT INTO t (k, a, b, c) VALUES (1, NaN, -Infinity, -1.5E+10)")
        else {
            panic!("expected INSERT");
        };
        assert_eq!(insert.values[1], Literal::Number("NaN".into()));
        assert_eq!(insert.values[2], Literal::Number("-Infinity".into()));
        assert_eq!(insert.values[3], Literal::Number("-1.5E+10".into()));
    }

    #[test]
    fn test_batch() {
        let Statement::Batch(batch) = statement(
            "BEGIN UNLOGGED BATCH
                INSERT INTO t (k, v) VALUES (1, 'a');
                UPDATE t SET v = 'b' WHERE k = 2;
             APPLY BATCH;",
        ) else {
            panic!("expected BATCH");
        };
        assert_eq!(batch.kind, BatchKind::Unlogged);
        assert_eq!(batch.statements.len(), 2);
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse("SELEKT * FROM t"), Err(QueryError::Syntax(_))));
        assert!(matches!(parse("SELECT * FROM"), Err(QueryError::Syntax(_))));
        assert!(matches!(parse("SELECT * FROM t t2"), Err(QueryError::Syntax(_))));
        assert!(matches!(
            parse("BEGIN BATCH SELECT * FROM t; APPLY BATCH"),
            Err(QueryError::Syntax(_))
        ));
    }

    #[test]
    fn test_unknown_type_is_invalid() {
        assert!(matches!(
            parse("CREATE TABLE t (k int PRIMARY KEY, v list<int>)"),
            Err(QueryError::InvalidQuery(_))
        ));
        assert!(matches!(
            parse("CREATE TABLE t (k int PRIMARY KEY, v money)"),
            Err(QueryError::InvalidQuery(_))
        ));
    }
}
