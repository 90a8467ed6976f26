use indoc::indoc;
use midichlorian::{
    frontend::{SourceFile, parser::Parser},
    middle::{
        analyzer::Analyzer,
        hir::{Entity, ExpressionKind, Program, Statement},
        ty::Type,
    },
};

fn analyze(source: &str) -> Result<Program, String> {
    let file = SourceFile::from_memory(source);
    let ast = Parser::parse_program(&file).map_err(|error| error.to_string())?;

    Analyzer::analyze_program(&ast).map_err(|error| error.to_string())
}

#[test]
fn accepts_valid_programs() {
    let programs = [
        ("return in nested if", "order absolute f() { should light { execute light } }"),
        ("short return in nested if", "order f() { should light { execute } }"),
        ("break in nested if", "as dark { should light { unleash } }"),
        ("continue in nested loop", "as dark { force (x in [1, 2]) { endure } }"),
        ("assigned functions", "order absolute f() { execute dark }\norder g = f\ng = f"),
        (
            "call of assigned functions",
            "order absolute f(cred x) { execute light }\norder g = f\ng(1)",
        ),
        (
            "pass a function to a function",
            indoc! {"
                order cred f(cred x, (absolute) -> void y) { execute 1 }
                order g(absolute z) {}
                f(2, g)
            "},
        ),
        (
            "function return types",
            indoc! {"
                order cred square(cred x) { execute x * x }
                order (cred) -> cred compose() { execute square }
            "},
        ),
        ("recursion", "order cred f(cred count) { execute f(count - 1) }"),
        ("negative", "cred x = -7"),
        ("negation", "absolute a = darth light"),
        ("increment and decrement", "cred x = 7\nx++\nx--"),
        ("arithmetic", "cred x = 7 * 5 / 2 % 3 + 1 - 2 ** 3"),
        ("float arithmetic", "ket x = 1.5 * 2.0 ** 0.5"),
        ("string concatenation", "transmission s = \"a\" + \"b\""),
        ("string comparison", "absolute b = \"a\" < \"b\""),
        ("onewith", "absolute b = 1 onewith 1"),
        ("constants", "const x = 1\nconst ket y = 2.0"),
        ("arrays", "tome<cred> a = [1, 2, 3]\na[0] = a[1]\nemit a[2]"),
        ("empty arrays", "tome<ket> a = tome<ket>[]"),
        (
            "maps",
            "holocron<cred, transmission> m = <0: \"zero\", 1: \"one\">\nm[2] = m[0]",
        ),
        ("for each", "force (x in [1.0, 2.0]) { emit x }"),
        ("counting for", "force (cred i = 10; i > 0; i--) { emit i }"),
        ("print takes anything", "print(1, \"two\", 3.0, [light])"),
        ("math library", "ket x = sqrt(pi) + sin(0.5) * cos(0.5)"),
        (
            "else if chains",
            indoc! {"
                cred x = 3
                should x < 1 {
                  cred y = 1
                } altshould x < 2 {
                  cred y = 2
                } elseshould {
                  cred y = 3
                }
            "},
        ),
        ("comments", "cred x = 1 >< this is ignored\nemit x"),
    ];

    for (name, source) in programs {
        if let Err(error) = analyze(source) {
            panic!("{name}: expected success but got '{error}'");
        }
    }
}

#[test]
fn rejects_invalid_programs() {
    let programs = [
        ("undeclared identifier", "emit x", "Identifier x not declared"),
        ("redeclaration", "cred x = 1\ncred x = 2", "Identifier x already declared"),
        (
            "shadowing",
            "cred x = 1\nshould light { cred x = 1 }",
            "Identifier x already declared",
        ),
        ("out of scope", "should light { cred x = 1 }\nemit x", "Identifier x not declared"),
        ("self reference", "cred x = x", "Identifier x not declared"),
        ("redeclared library item", "cred print = 1", "Identifier print already declared"),
        ("assign to const", "const x = 1\nx = 2", "Cannot assign to constant x"),
        ("increment const", "const x = 1\nx++", "Cannot assign to constant x"),
        ("assign to pi", "pi = 3.0", "Cannot assign to constant pi"),
        (
            "assign to a function",
            "order f() {}\nf = f",
            "Cannot assign to constant f",
        ),
        (
            "assign to loop iterator",
            "force (cred i = 0; i < 5; i++) { i = 2 }",
            "Cannot assign to constant i",
        ),
        ("assign bad type", "cred x = 1\nx = light", "Cannot assign a absolute to a cred"),
        (
            "declare bad type",
            "tome<ket> a = [1, 2]",
            "Cannot assign a tome<cred> to a tome<ket>",
        ),
        ("bad types for or", "emit dark or 1", "Expected a absolute but got a cred"),
        ("bad types for and", "emit dark and 1", "Expected a absolute but got a cred"),
        ("bad types for ==", "emit dark == 1", "Operands do not have the same type"),
        ("bad types for !=", "emit dark != 1", "Operands do not have the same type"),
        ("mixed numbers", "emit 1 + 1.0", "Operands do not have the same type"),
        ("bad types for +", "emit dark + 1", "Expected a number or transmission but got a absolute"),
        ("bad types for -", "emit dark - 1", "Expected a number but got a absolute"),
        ("bad types for *", "emit \"a\" * 1", "Expected a number but got a transmission"),
        ("bad types for **", "emit dark ** 1", "Expected a number but got a absolute"),
        ("bad types for <", "emit dark < 1", "Expected a number or transmission but got a absolute"),
        ("bad types for negation", "emit -light", "Expected a number but got a absolute"),
        ("bad types for darth", "emit darth 1", "Expected a absolute but got a cred"),
        ("non-boolean if test", "should 1 {}", "Expected a absolute but got a cred"),
        ("non-boolean while test", "as 1 {}", "Expected a absolute but got a cred"),
        ("break outside loop", "unleash", "'unleash' can only appear in a loop"),
        ("continue outside loop", "endure", "'endure' can only appear in a loop"),
        (
            "break inside function inside loop",
            "as light { order f() { unleash } }",
            "'unleash' can only appear in a loop",
        ),
        ("return outside function", "execute 1", "Execute can only appear in an order"),
        (
            "return value from void function",
            "order f() { execute 1 }",
            "Cannot execute a value here",
        ),
        (
            "return nothing from cred function",
            "order cred f() { execute }",
            "Something should be executed here",
        ),
        (
            "return bad type",
            "order cred f() { execute light }",
            "Cannot assign a absolute to a cred",
        ),
        (
            "too many arguments",
            "order f(cred x) {}\nf(1, 2)",
            "1 parameter(s) required but 2 argument(s) passed",
        ),
        (
            "too few arguments",
            "order f(cred x) {}\nf()",
            "1 parameter(s) required but 0 argument(s) passed",
        ),
        (
            "parameter type mismatch",
            "order f(cred x) {}\nf(dark)",
            "Cannot assign a absolute to a cred",
        ),
        ("call of non-function", "cred x = 1\nemit x()", "Call of non-order"),
        (
            "function type mismatch",
            indoc! {"
                order cred f(cred x, (absolute) -> void y) { execute 1 }
                order cred g(absolute z) { execute 5 }
                f(2, g)
            "},
            "Cannot assign a (absolute) -> cred to a (absolute) -> void",
        ),
        (
            "void function where a value is returned",
            indoc! {"
                order cred f(cred x, (absolute) -> cred y) { execute 1 }
                order g(absolute z) {}
                f(2, g)
            "},
            "Cannot assign a (absolute) -> void to a (absolute) -> cred",
        ),
        (
            "heterogeneous array",
            "emit [1, light]",
            "Not all elements have the same type",
        ),
        ("heterogeneous keys", "emit <1: 2, light: 3>", "Not all keys have the same type"),
        ("heterogeneous values", "emit <1: 2, 2: dark>", "Not all values have the same type"),
        ("subscript of non-collection", "cred x = 1\nemit x[0]", "Expected a tome or holocron but got a cred"),
        ("non-integer index", "emit [1, 2][light]", "Expected a cred but got a absolute"),
        ("for each over non-array", "force (x in 5) {}", "Expected a tome but got a cred"),
        (
            "non-integer counting iterator",
            "force (ket i = 0.0; i < 1.0; i++) {}",
            "Expected a cred but got a ket",
        ),
        ("void variable", "void x = 1", "Type void can only be returned"),
        ("printing void", "order f() {}\nemit f()", "Type void can only be returned"),
        ("passing void to print", "order f() {}\nprint(f())", "Type void can only be returned"),
        ("order holding a number", "order g = 1", "Expected a order but got a cred"),
        ("increment a float", "ket x = 1.0\nx++", "Expected a cred but got a ket"),
    ];

    for (name, source, expected) in programs {
        match analyze(source) {
            Ok(_) => panic!("{name}: expected '{expected}' but analysis succeeded"),
            Err(error) => assert_eq!(error, expected, "{name}"),
        }
    }
}

#[test]
fn variables_get_the_type_of_their_initializer() {
    let program = analyze("cred x = 7\ncred y = x + 0\nemit y").unwrap();

    let user_variables = program
        .entities
        .iter()
        .filter(|entity| entity.library().is_none())
        .collect::<Vec<_>>();

    assert_eq!(user_variables.len(), 2);
    for entity in user_variables {
        assert!(matches!(entity, Entity::Variable(_)));
        assert_eq!(entity.ty(), &Type::integer());
    }
}

#[test]
fn references_resolve_to_the_declared_entity() {
    let program = analyze("cred x = 1\nemit x").unwrap();

    let [
        Statement::VariableDeclaration { variable, .. },
        Statement::Print(value),
    ] = program.statements.as_slice()
    else {
        panic!("unexpected statements: {:#?}", program.statements);
    };

    assert_eq!(value.kind, ExpressionKind::Entity(*variable));
    assert_eq!(value.ty, Type::integer());
}

#[test]
fn functions_are_visible_inside_their_body() {
    let program = analyze("order cred f(cred n) { execute f(n - 1) }").unwrap();

    let [Statement::FunctionDeclaration { function, body }] = program.statements.as_slice() else {
        panic!("unexpected statements: {:#?}", program.statements);
    };

    let [Statement::Return(value)] = body.as_slice() else {
        panic!("unexpected body: {body:#?}");
    };

    let ExpressionKind::Call { callee, .. } = &value.kind else {
        panic!("expected a call but got {value:#?}");
    };

    assert_eq!(callee.kind, ExpressionKind::Entity(*function));
}
