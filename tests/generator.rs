use indoc::indoc;
use midichlorian::{OutputKind, compile, frontend::SourceFile};

fn generate(source: &str) -> String {
    compile(&SourceFile::from_memory(source), OutputKind::Js).unwrap()
}

#[test]
fn basic_types() {
    let source = indoc! {r#"
        absolute y = light
        ket x = 2.16
        cred a = 300
        cred b = -200
        transmission onlyhope = "Obi-Wan"
        absolute t = light and dark
        absolute s = dark or light
        absolute h = darth y
        absolute i = darth light
        cred j = -a
    "#};

    assert_eq!(
        generate(source),
        indoc! {r#"
            let y_1 = true
            let x_2 = 2.16
            let a_3 = 300
            let b_4 = -200
            let onlyhope_5 = "Obi-Wan"
            let t_6 = false
            let s_7 = true
            let h_8 = !y_1
            let i_9 = false
            let j_10 = -a_3
        "#}
    );
}

#[test]
fn complex_types() {
    let source = indoc! {r#"
        tome<cred> nums = [1, 2, 3, 4, 5]
        holocron<cred, transmission> plans = <0: "exhaust hole", 1: "proton torpedo">
        tome<ket> empty = tome<ket>[]
        emit nums[2]
        emit plans[1]
        plans[2] = "shield generator"
        nums[0] = 10
    "#};

    assert_eq!(
        generate(source),
        indoc! {r#"
            let nums_1 = [1, 2, 3, 4, 5]
            let plans_2 = new Map([[0, "exhaust hole"], [1, "proton torpedo"]])
            let empty_3 = []
            console.log(nums_1[2])
            console.log(plans_2.get(1))
            plans_2.set(2, "shield generator")
            nums_1[0] = 10
        "#}
    );
}

#[test]
fn assignment() {
    assert_eq!(generate("cred x = 5\nx = 55"), "let x_1 = 5\nx_1 = 55\n");
}

#[test]
fn long_if_statement() {
    let source = indoc! {r#"
        cred x = 5
        should x onewith 5 {
          emit x
        } elseshould {
          emit "nope"
        }
    "#};

    assert_eq!(
        generate(source),
        indoc! {r#"
            let x_1 = 5
            if (x_1 === 5) {
              console.log(x_1)
            } else {
              console.log("nope")
            }
        "#}
    );
}

#[test]
fn short_if_statement() {
    let source = indoc! {"
        cred x = 5
        should x != 5 {
          emit x
        }
    "};

    assert_eq!(
        generate(source),
        indoc! {"
            let x_1 = 5
            if (x_1 !== 5) {
              console.log(x_1)
            }
        "}
    );
}

#[test]
fn else_if_chain() {
    let source = indoc! {"
        cred x = 5
        should x < 1 {
          emit 1
        } altshould x < 2 {
          emit 2
        } elseshould {
          emit 3
        }
    "};

    assert_eq!(
        generate(source),
        indoc! {"
            let x_1 = 5
            if (x_1 < 1) {
              console.log(1)
            } else if (x_1 < 2) {
              console.log(2)
            } else {
              console.log(3)
            }
        "}
    );
}

#[test]
fn while_loop() {
    let source = indoc! {"
        cred x = 0
        as x > 5 {
          emit x
          should x onewith 2 {
            unleash
          }
          x--
          endure
        }
    "};

    assert_eq!(
        generate(source),
        indoc! {"
            let x_1 = 0
            while (x_1 > 5) {
              console.log(x_1)
              if (x_1 === 2) {
                break
              }
              x_1--
              continue
            }
        "}
    );
}

#[test]
fn functions() {
    let source = indoc! {"
        order cred square(cred x) { execute x * x }
        order fncall() {
          emit square(2)
          execute
        }
        (cred) -> cred alias = square
        fncall()
    "};

    assert_eq!(
        generate(source),
        indoc! {"
            function square_1(x_2) {
              return x_2 * x_2
            }
            function fncall_3() {
              console.log(square_1(2))
              return
            }
            let alias_4 = square_1
            fncall_3()
        "}
    );
}

#[test]
fn for_loops() {
    let source = indoc! {"
        force (cred i = 0; i < 5; i++) {
          emit i
        }
        force (x in [1, 2, 3]) {
          emit x
        }
    "};

    assert_eq!(
        generate(source),
        indoc! {"
            for (let i_1 = 0; i_1 < 5; i_1++) {
              console.log(i_1)
            }
            for (const x_2 of [1, 2, 3]) {
              console.log(x_2)
            }
        "}
    );
}

#[test]
fn fibonacci() {
    let source = indoc! {"
        >< the classic
        order cred fib(cred n) {
          should n <= 1 {
            execute n
          }
          execute fib(n - 1) + fib(n - 2)
        }
        emit fib(10)
    "};

    assert_eq!(
        generate(source),
        indoc! {"
            function fib_1(n_2) {
              if (n_2 <= 1) {
                return n_2
              }
              return fib_1(n_2 - 1) + fib_1(n_2 - 2)
            }
            console.log(fib_1(10))
        "}
    );
}

#[test]
fn standard_library() {
    let source = indoc! {r#"
        print("hello", 1)
        emit sqrt(4.0) * pi
        emit sin(0.0) + cos(0.0)
    "#};

    assert_eq!(
        generate(source),
        indoc! {r#"
            console.log("hello", 1)
            console.log(Math.sqrt(4.0) * Math.PI)
            console.log(Math.sin(0.0) + Math.cos(0.0))
        "#}
    );
}

#[test]
fn operators() {
    let source = indoc! {"
        cred x = 7
        absolute b = light
        emit x / 2
        emit -x ** 2
        emit (x + 1) % 3
        emit darth b and x >= 1 or b
    "};

    assert_eq!(
        generate(source),
        indoc! {"
            let x_1 = 7
            let b_2 = true
            console.log(Math.trunc(x_1 / 2))
            console.log(-(x_1 ** 2))
            console.log((x_1 + 1) % 3)
            console.log(((!b_2) && (x_1 >= 1)) || b_2)
        "}
    );
}

#[test]
fn generates_optimized_code() {
    let source = indoc! {"
        cred x = 2 + 3
        should light {
          emit x * 1
        }
        as dark {
          emit x
        }
    "};

    assert_eq!(generate(source), "let x_1 = 5\nconsole.log(x_1)\n");
}
